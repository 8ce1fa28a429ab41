//! Configuration loader with layered approach.
//!
//! The loader applies configuration in layers, later layers overriding
//! earlier ones:
//!
//! 1. Default values (built into the code)
//! 2. Configuration file (TOML or JSON)
//! 3. Environment variables (with a configurable prefix)
//!
//! `load()` validates the final result.

use std::env;
use std::fs;
use std::path::Path;

use crate::{CerberusConfig, ConfigError};

/// Layered configuration loader.
///
/// # Example
///
/// ```no_run
/// use cerberus_config::ConfigLoader;
///
/// # fn main() -> Result<(), cerberus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_dotenv()
///     .with_file("cerberus.toml")?
///     .with_env_prefix("CERBERUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CerberusConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CerberusConfig::default(),
            env_prefix: None,
        }
    }

    /// Loads `.env` into the process environment, when present.
    ///
    /// Missing `.env` files are not an error.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Loads configuration from a TOML or JSON file, by extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] when the path does not exist,
    /// [`ConfigError::UnsupportedFormat`] for other extensions, and parse
    /// errors for malformed content.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        Ok(self)
    }

    /// Enables environment variable overrides with the given prefix.
    ///
    /// Recognized variables (shown for prefix `CERBERUS`):
    ///
    /// | variable | field |
    /// |---|---|
    /// | `CERBERUS_TENANT_PRIMARY_HEADER` | `tenant.primary_header` |
    /// | `CERBERUS_TENANT_ALIAS_HEADER` | `tenant.alias_header` |
    /// | `CERBERUS_CORRELATION_HEADER` | `correlation.header` |
    /// | `CERBERUS_CORRELATION_TRUST_INCOMING` | `correlation.trust_incoming` |
    /// | `CERBERUS_RATE_LIMIT_MAX_REQUESTS` | `rate_limit.max_requests` |
    /// | `CERBERUS_RATE_LIMIT_WINDOW_SECONDS` | `rate_limit.window_seconds` |
    /// | `CERBERUS_IDEMPOTENCY_HEADER` | `idempotency.header` |
    /// | `CERBERUS_IDEMPOTENCY_ENABLED` | `idempotency.enabled` |
    /// | `CERBERUS_LOCALE_DEFAULT_LOCALE` | `locale.default_locale` |
    /// | `CERBERUS_LOCALE_DEFAULT_TIMEZONE` | `locale.default_timezone` |
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Applies the environment layer and validates the final configuration.
    pub fn load(mut self) -> Result<CerberusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    fn apply_env(&mut self, prefix: &str) -> Result<(), ConfigError> {
        if let Some(value) = env_var(prefix, "TENANT_PRIMARY_HEADER") {
            self.config.tenant.primary_header = value;
        }
        if let Some(value) = env_var(prefix, "TENANT_ALIAS_HEADER") {
            self.config.tenant.alias_header = value;
        }
        if let Some(value) = env_var(prefix, "CORRELATION_HEADER") {
            self.config.correlation.header = value;
        }
        if let Some(value) = env_var(prefix, "CORRELATION_TRUST_INCOMING") {
            self.config.correlation.trust_incoming =
                parse_env(prefix, "CORRELATION_TRUST_INCOMING", &value)?;
        }
        if let Some(value) = env_var(prefix, "RATE_LIMIT_MAX_REQUESTS") {
            self.config.rate_limit.max_requests =
                parse_env(prefix, "RATE_LIMIT_MAX_REQUESTS", &value)?;
        }
        if let Some(value) = env_var(prefix, "RATE_LIMIT_WINDOW_SECONDS") {
            self.config.rate_limit.window_seconds =
                parse_env(prefix, "RATE_LIMIT_WINDOW_SECONDS", &value)?;
        }
        if let Some(value) = env_var(prefix, "IDEMPOTENCY_HEADER") {
            self.config.idempotency.header = value;
        }
        if let Some(value) = env_var(prefix, "IDEMPOTENCY_ENABLED") {
            self.config.idempotency.enabled = parse_env(prefix, "IDEMPOTENCY_ENABLED", &value)?;
        }
        if let Some(value) = env_var(prefix, "LOCALE_DEFAULT_LOCALE") {
            self.config.locale.default_locale = value;
        }
        if let Some(value) = env_var(prefix, "LOCALE_DEFAULT_TIMEZONE") {
            self.config.locale.default_timezone = value;
        }
        Ok(())
    }
}

fn env_var(prefix: &str, suffix: &str) -> Option<String> {
    env::var(format!("{prefix}_{suffix}")).ok()
}

fn parse_env<T: std::str::FromStr>(
    prefix: &str,
    suffix: &str,
    value: &str,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err: T::Err| ConfigError::env_parse(format!("{prefix}_{suffix}"), err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Env-var tests use unique prefixes so parallel tests never collide.

    #[test]
    fn test_defaults_pass_validation() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, CerberusConfig::default());
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[rate_limit]\nmax_requests = 7\nwindow_seconds = 60").unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.rate_limit.max_requests, 7);
        assert_eq!(config.tenant.primary_header, "x-organization-id");
    }

    #[test]
    fn test_json_file_layer() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"idempotency": {{"enabled": false}}}}"#).unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(!config.idempotency.enabled);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ConfigLoader::new().with_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_unsupported_extension_is_an_error() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_env_layer_overrides_file_layer() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[rate_limit]\nmax_requests = 7").unwrap();

        env::set_var("CERBTEST_A_RATE_LIMIT_MAX_REQUESTS", "9");
        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .with_env_prefix("CERBTEST_A")
            .load()
            .unwrap();
        env::remove_var("CERBTEST_A_RATE_LIMIT_MAX_REQUESTS");

        assert_eq!(config.rate_limit.max_requests, 9);
    }

    #[test]
    fn test_env_parse_failure_is_reported() {
        env::set_var("CERBTEST_B_RATE_LIMIT_MAX_REQUESTS", "many");
        let result = ConfigLoader::new().with_env_prefix("CERBTEST_B").load();
        env::remove_var("CERBTEST_B_RATE_LIMIT_MAX_REQUESTS");

        assert!(matches!(result, Err(ConfigError::EnvParse { .. })));
    }

    #[test]
    fn test_load_validates_final_config() {
        env::set_var("CERBTEST_C_RATE_LIMIT_MAX_REQUESTS", "0");
        let result = ConfigLoader::new().with_env_prefix("CERBTEST_C").load();
        env::remove_var("CERBTEST_C_RATE_LIMIT_MAX_REQUESTS");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
