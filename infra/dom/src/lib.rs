//! # Host Document
//!
//! An in-memory stand-in for the browser document the initializer runs
//! against. It provides what the directive scanner and components need and
//! nothing more:
//!
//! * an arena tree of document, element, text and comment nodes addressed by
//!   [`NodeId`];
//! * a lenient markup parser (`nom`) for page loads and asynchronous content
//!   replacement ([`Document::set_inner_markup`]);
//! * a selector engine for the subset of CSS that directive blocks use
//!   (type, `*`, `#id`, `.class`, attribute operators, descendant and child
//!   combinators, selector lists);
//! * markup serialization for tests and tooling.
//!
//! ```rust
//! use weld_dom::Document;
//!
//! let doc = Document::parse(r#"<ul id="menu"><li class="item">A</li><li class="item">B</li></ul>"#)
//!     .unwrap();
//! let items = doc.query_selector_all(doc.root(), "#menu > .item").unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(doc.text_content(items[1]), "B");
//! ```

mod document;
mod error;
mod markup;
mod selector;

pub use document::{Attribute, Descendants, Document, Element, NodeData};
pub use error::{DomError, DomErrorExt};
pub use selector::SelectorList;
pub use weld_domain::NodeId;
