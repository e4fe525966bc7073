use serde::Serialize;
use serde_json::Value;
use std::fmt;
use weld_domain::NodeId;

/// Where a directive's component is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "node")]
pub enum Target {
    Element(NodeId),
    Global,
}

impl Target {
    #[must_use]
    pub const fn element(self) -> Option<NodeId> {
        match self {
            Self::Element(node) => Some(node),
            Self::Global => None,
        }
    }
}

/// Markup that produced a directive. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum Origin {
    /// Single-element attribute on `element`.
    Attribute { element: NodeId },
    /// Global block `script`; `key` is the selector or wildcard entry.
    Block { script: NodeId, key: Option<String> },
    /// A content-updated signal, for failures raised before any scan.
    Update { root: NodeId },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute { element } => write!(f, "attribute on {element}"),
            Self::Block { script, key: None } => write!(f, "block {script}"),
            Self::Block { script, key: Some(key) } => write!(f, "block {script} entry '{key}'"),
            Self::Update { root } => write!(f, "content update at {root}"),
        }
    }
}

/// One component to initialize. Built by the scanner, consumed by the
/// dispatcher, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub component: String,
    pub config: Value,
    pub target: Target,
    pub origin: Origin,
}

impl Directive {
    /// `null` or `{}`: the directive asks for nothing beyond running.
    #[must_use]
    pub fn has_empty_config(&self) -> bool {
        match &self.config {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}
