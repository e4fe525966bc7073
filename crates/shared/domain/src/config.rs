use crate::constants::{
    DEFAULT_BLOCK_TYPE, DEFAULT_INIT_ATTRIBUTE, DEFAULT_LOG_LEVEL, DEFAULT_WILDCARD,
};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeldConfigInner {
    pub initializer: InitializerConfig,
    pub logging: LoggingConfig,
}

/// Arc-wrapped config, cheap to clone into the page runtime and the CLI.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct WeldConfig {
    #[serde(flatten, default)]
    inner: Arc<WeldConfigInner>,
}

impl Deref for WeldConfig {
    type Target = WeldConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for WeldConfig {
    fn deref_mut(&mut self) -> &mut WeldConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Markup conventions recognised by the directive scanner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InitializerConfig {
    /// Attribute holding a single-element payload.
    pub attribute: String,
    /// `type` of `<script>` blocks holding document-level payloads.
    pub block_type: String,
    /// Block key that means "no element binding".
    pub wildcard: String,
    /// Remove attributes and detach blocks once scanned, so a later subtree
    /// rescan cannot dispatch them again.
    pub consume_sources: bool,
}

/// Diagnostic channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub console: bool,
    pub json: bool,
    pub directory: Option<PathBuf>,
}

// --- Default ---

impl Default for InitializerConfig {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_INIT_ATTRIBUTE.to_owned(),
            block_type: DEFAULT_BLOCK_TYPE.to_owned(),
            wildcard: DEFAULT_WILDCARD.to_owned(),
            consume_sources: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_owned(), console: true, json: false, directory: None }
    }
}
