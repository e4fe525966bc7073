/// Attribute carrying a single-element directive payload.
pub const DEFAULT_INIT_ATTRIBUTE: &str = "data-mage-init";

/// `type` of the `<script>` blocks carrying document-level directives.
/// Such blocks are data, never executed.
pub const DEFAULT_BLOCK_TYPE: &str = "text/x-magento-init";

/// Block key meaning "no element binding, run once".
pub const DEFAULT_WILDCARD: &str = "*";

/// Prefix of environment overrides (`WELD__INITIALIZER__ATTRIBUTE`).
pub const ENV_PREFIX: &str = "WELD";

/// Default log level name.
pub const DEFAULT_LOG_LEVEL: &str = "info";
