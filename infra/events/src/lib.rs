//! # Event Bus
//!
//! A small, typed broadcast bus. The page runtime uses it to carry
//! page signals (ready, content updated) from whoever mutates the document,
//! typically a network callback on another task, to the single listener
//! that owns initialization.
//!
//! * Channels are keyed by the Rust type of the event.
//! * Every channel is a `tokio::sync::broadcast` channel, so each subscriber
//!   sees events in publication order.
//! * Publishing with nobody listening is not an error; the event is dropped
//!   and traced.
//!
//! # Example
//!
//! ```rust
//! use weld_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Refreshed(usize);
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<Refreshed>()?;
//!
//!     bus.publish(Refreshed(3))?;
//!     assert_eq!(rx.next_event().await.map(|e| e.0), Some(3));
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
