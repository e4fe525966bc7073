use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Signals that trigger a directive scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "camelCase")]
pub enum PageSignal {
    /// Markup is fully ready; scans the whole document once per page load.
    Ready,
    /// Markup below `root` was replaced; rescans that subtree only.
    ContentUpdated { root: NodeId },
}
