//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it loads configuration and markup sources for
//! the page runtime and the CLI.
//!
//! ## Config loading
//! ```rust,no_run
//! use weld_kernel::config::load_config;
//! use weld_kernel::domain::config::WeldConfig;
//!
//! let cfg: WeldConfig = load_config(Some("weld.toml")).unwrap();
//! assert_eq!(cfg.initializer.attribute, "data-mage-init");
//! ```
//!
//! ## Markup sources
//! ```rust,no_run
//! let doc = weld_kernel::source::load_document("page.html").unwrap();
//! # drop(doc);
//! ```
pub mod config;
pub mod source;

pub use weld_domain as domain;
