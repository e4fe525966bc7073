use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;
use weld_domain::constants::ENV_PREFIX;

#[weld_derive::weld_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration structure from an optional file plus environment
/// overrides.
///
/// 1. **File**: TOML, JSON or YAML, picked by extension. When `path` is
///    `None` no file is read and every field falls back to its serde default.
/// 2. **Environment**: variables prefixed with `WELD__`; nesting uses double
///    underscores (`WELD__INITIALIZER__ATTRIBUTE` → `initializer.attribute`).
///    Values such as `false` or `64` are parsed into their typed form.
///
/// # Errors
/// * The given file is missing or unreadable.
/// * The merged sources do not match the structure of `T`.
///
/// # Example
/// ```rust
/// use weld_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     #[serde(default)]
///     strict: bool,
/// }
///
/// let cfg: AppConfig = load_config(None::<&str>).unwrap_or_default();
/// # drop(cfg);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load(path.as_ref().map(|p| p.as_ref()), environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load<T>(path: Option<&Path>, environment: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        },
        None => info!("No config file given, using defaults and environment"),
    }

    let config = builder
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use weld_domain::config::WeldConfig;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        environment().source(Some(map))
    }

    #[test]
    fn defaults_without_sources() {
        let cfg: WeldConfig = load(None, env(&[])).unwrap();
        assert_eq!(cfg.initializer.attribute, "data-mage-init");
        assert_eq!(cfg.initializer.block_type, "text/x-magento-init");
        assert!(cfg.initializer.consume_sources);
    }

    #[test]
    fn environment_overrides_nested_fields() {
        let cfg: WeldConfig = load(
            None,
            env(&[
                ("WELD__INITIALIZER__ATTRIBUTE", "data-init"),
                ("WELD__INITIALIZER__CONSUME_SOURCES", "false"),
                ("WELD__LOGGING__LEVEL", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.initializer.attribute, "data-init");
        assert!(!cfg.initializer.consume_sources);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load::<WeldConfig>(Some(Path::new("/nonexistent/weld.toml")), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Config { .. }));
        assert_eq!(err.context(), Some("Failed to build config"));
    }
}
