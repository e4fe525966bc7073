//! # Directive Scanner
//!
//! Turns the markup of a subtree into an ordered list of [`Directive`]s.
//!
//! Two sources are read, in this order:
//!
//! 1. **Element attributes** (`data-mage-init` by default): every element of
//!    the scope carrying the attribute, in document order. The value is a
//!    JSON object `{component: config, ...}`; the element is the target.
//! 2. **Global blocks** (`<script type="text/x-magento-init">` by default),
//!    in document order. The body maps selector (or the wildcard `*`) to
//!    `{component: config, ...}`. Selectors are evaluated inside the scope;
//!    the wildcard yields global directives.
//!
//! A bad source never stops the scan; it is recorded as a [`Failure`] and
//! the next source is read. With `consume_sources` on, attributes are removed
//! and blocks detached as they are read, so a later rescan of an enclosing
//! subtree does not see them again.

use crate::directive::{Directive, Origin, Target};
use crate::error::{InitError, InitErrorExt};
use crate::report::Failure;
use serde_json::{Map, Value};
use tracing::debug;
use weld_dom::Document;
use weld_domain::NodeId;
use weld_domain::config::InitializerConfig;

/// Output of one scan.
#[derive(Debug, Default)]
pub struct Scan {
    pub directives: Vec<Directive>,
    pub failures: Vec<Failure>,
}

/// Reads directive sources out of a subtree.
///
/// Ordering of [`Scan::directives`], which the dispatcher keeps:
///
/// * every attribute directive comes before every block directive, even when
///   a block binds an element that precedes an attribute carrier;
/// * attribute carriers follow document order, and an element's components
///   follow payload order;
/// * blocks follow document order, entries follow block order, and a
///   selector's matches follow document order.
#[derive(Debug, Clone)]
pub struct Scanner {
    attribute: String,
    block_type: String,
    wildcard: String,
    consume: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(&InitializerConfig::default())
    }
}

impl Scanner {
    #[must_use]
    pub fn new(config: &InitializerConfig) -> Self {
        Self {
            attribute: config.attribute.clone(),
            block_type: config.block_type.clone(),
            wildcard: config.wildcard.clone(),
            consume: config.consume_sources,
        }
    }

    /// Collects the directives of `scope` and its descendants.
    ///
    /// An unknown `scope` yields an empty scan.
    pub fn scan(&self, doc: &mut Document, scope: NodeId) -> Scan {
        let mut scan = Scan::default();

        let carriers: Vec<NodeId> =
            doc.elements(scope).filter(|&id| doc.has_attribute(id, &self.attribute)).collect();
        for element in carriers {
            self.scan_attribute(doc, element, &mut scan);
        }

        let blocks: Vec<NodeId> = doc.elements(scope).filter(|&id| self.is_block(doc, id)).collect();
        for block in blocks {
            self.scan_block(doc, scope, block, &mut scan);
        }

        debug!(
            scope = %scope,
            directives = scan.directives.len(),
            failures = scan.failures.len(),
            "Scan finished"
        );
        scan
    }

    fn is_block(&self, doc: &Document, id: NodeId) -> bool {
        doc.tag_name(id) == Some("script")
            && doc.attribute(id, "type").is_some_and(|kind| kind.trim().eq_ignore_ascii_case(&self.block_type))
    }

    fn scan_attribute(&self, doc: &mut Document, element: NodeId, scan: &mut Scan) {
        let origin = Origin::Attribute { element };
        let raw = if self.consume {
            doc.remove_attribute(element, &self.attribute)
        } else {
            doc.attribute(element, &self.attribute).map(str::to_owned)
        };
        let Some(raw) = raw else { return };

        let components = match parse_object(&raw, &origin) {
            Ok(components) if components.is_empty() => Err(InitError::Shape {
                message: "Payload names no component".into(),
                context: Some(origin.to_string().into()),
            }),
            other => other,
        };

        match components {
            Ok(components) => {
                let target = Target::Element(element);
                scan.directives.extend(components.into_iter().map(|(component, config)| Directive {
                    component,
                    config,
                    target,
                    origin: origin.clone(),
                }));
            },
            Err(error) => scan.failures.push(Failure::new(origin, None, error)),
        }
    }

    fn scan_block(&self, doc: &mut Document, scope: NodeId, block: NodeId, scan: &mut Scan) {
        let origin = Origin::Block { script: block, key: None };
        let raw = doc.text_content(block);
        if self.consume {
            if let Err(error) = doc.detach(block) {
                scan.failures.push(Failure::new(
                    origin.clone(),
                    None,
                    InitError::Internal { message: error.to_string().into(), context: None },
                ));
            }
        }

        let entries = match parse_object(&raw, &origin) {
            Ok(entries) => entries,
            Err(error) => {
                scan.failures.push(Failure::new(origin, None, error));
                return;
            },
        };

        for (key, value) in entries {
            let origin = Origin::Block { script: block, key: Some(key.clone()) };
            let Value::Object(components) = value else {
                let error = InitError::Shape {
                    message: format!("Expected an object of components, found {}", kind_of(&value)).into(),
                    context: Some(origin.to_string().into()),
                };
                scan.failures.push(Failure::new(origin, None, error));
                continue;
            };

            if key == self.wildcard {
                push_all(&mut scan.directives, &components, Target::Global, &origin);
                continue;
            }

            match doc.query_selector_all(scope, &key).context(origin.to_string()) {
                Ok(matched) => {
                    if matched.is_empty() {
                        debug!(selector = %key, "Selector matched nothing");
                    }
                    for element in matched {
                        push_all(&mut scan.directives, &components, Target::Element(element), &origin);
                    }
                },
                Err(error) => scan.failures.push(Failure::new(origin, None, error)),
            }
        }
    }
}

fn push_all(out: &mut Vec<Directive>, components: &Map<String, Value>, target: Target, origin: &Origin) {
    out.extend(components.iter().map(|(component, config)| Directive {
        component: component.clone(),
        config: config.clone(),
        target,
        origin: origin.clone(),
    }));
}

fn parse_object(raw: &str, origin: &Origin) -> Result<Map<String, Value>, InitError> {
    match serde_json::from_str::<Value>(raw).context(origin.to_string())? {
        Value::Object(map) => Ok(map),
        other => Err(InitError::Shape {
            message: format!("Expected a JSON object, found {}", kind_of(&other)).into(),
            context: Some(origin.to_string().into()),
        }),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
