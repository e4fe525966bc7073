//! # Declarative Component Initializer
//!
//! Rendered markup declares which components to start and with what
//! configuration; this crate finds those declarations, resolves each
//! component name against a [`ComponentRegistry`] and invokes it.
//!
//! ```text
//! markup ──► Scanner ──► Vec<Directive> ──► Dispatcher ──► components
//!                                  │                │
//!                                  └── failures ────┴──► Report + tracing
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use weld_dom::Document;
//! use weld_domain::config::InitializerConfig;
//! use weld_initializer::{ComponentRegistry, Initializer};
//!
//! let registry = ComponentRegistry::builder()
//!     .extension("tooltip", |doc, element, config| {
//!         let text = config["content"].as_str().unwrap_or_default().to_owned();
//!         doc.set_attribute(element, "title", text)?;
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut doc = Document::parse(r#"<a data-mage-init='{"tooltip": {"content": "hi"}}'>?</a>"#).unwrap();
//! let init = Initializer::new(&InitializerConfig::default(), Arc::new(registry));
//!
//! let report = init.on_ready(&mut doc).unwrap();
//! assert_eq!(report.dispatched.len(), 1);
//! assert_eq!(doc.outer_markup(doc.root()), r#"<a title="hi">?</a>"#);
//! ```

mod directive;
mod dispatcher;
mod error;
mod initializer;
mod page;
mod registry;
mod report;
mod resolver;
mod scanner;

pub use directive::{Directive, Origin, Target};
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, InitError, InitErrorExt};
pub use initializer::Initializer;
pub use page::{Handled, Page, PageListener, SharedDocument};
pub use registry::{
    ComponentError, ComponentRegistry, ComponentResult, Export, Extension, Invocable, Module,
    ObjectModule, RegistryBuilder, SideEffect,
};
pub use report::{Dispatched, Failure, Report};
pub use resolver::{Resolution, Strategy, resolve};
pub use scanner::{Scan, Scanner};
