//! Facade crate for weld.
//! Re-exports the domain, kernel, host document and initializer crates and
//! wires a page together. Keep this crate thin: it composes other crates,
//! it does not implement initialization logic.
//!
//! ## Usage
//! ```rust
//! use weld::dom::Document;
//! use weld::domain::config::WeldConfig;
//! use weld::initializer::ComponentRegistry;
//!
//! let registry = ComponentRegistry::builder()
//!     .side_effect("pageCache", |_| Ok(()))
//!     .build()
//!     .unwrap();
//! let doc = Document::parse(
//!     r#"<script type="text/x-magento-init">{"*": {"pageCache": {}}}</script>"#,
//! )
//! .unwrap();
//!
//! let page = weld::bootstrap(&WeldConfig::default(), registry, doc);
//! let report = page.ready().unwrap();
//! assert_eq!(report.dispatched.len(), 1);
//! ```

use std::sync::Arc;
use tracing::debug;

pub use weld_dom as dom;
pub use weld_domain as domain;
pub use weld_event_bus as events;
pub use weld_initializer as initializer;
pub use weld_kernel as kernel;
pub use weld_logger as logger;

use weld_dom::Document;
use weld_domain::config::WeldConfig;
use weld_event_bus::EventBus;
use weld_initializer::{ComponentRegistry, Initializer, Page};

/// Builds a [`Page`] from configuration, a finished registry and a parsed
/// document. Nothing runs until [`Page::ready`] or a ready signal arrives.
#[must_use]
pub fn bootstrap(config: &WeldConfig, registry: ComponentRegistry, document: Document) -> Page {
    debug!(components = registry.len(), attribute = %config.initializer.attribute, "Bootstrapping page");
    let initializer = Initializer::new(&config.initializer, Arc::new(registry));
    Page::new(document, initializer, EventBus::new())
}
