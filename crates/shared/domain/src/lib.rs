//! # Domain Models
//!
//! Pure data shared by every weld crate: node identifiers, page signals,
//! configuration and the conventional markup names. Keep it lean: `serde`
//! only, no I/O, no behaviour beyond trivial helpers.

pub mod config;
pub mod constants;
pub mod node;
pub mod signal;

pub use node::NodeId;
pub use signal::PageSignal;
