//! Structured logging setup.
//!
//! Integrates with the tracing-subscriber ecosystem: an `EnvFilter` built
//! from the configured level (overridable via `RUST_LOG`), JSON output for
//! production, human-readable output for development.
//!
//! # Example
//!
//! ```rust,ignore
//! use cerberus_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(tenant_id = "org1", "request admitted");
//! ```

use crate::{TelemetryError, TelemetryResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Log level (e.g. "info", "debug", "warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Initializes the logging subsystem.
///
/// `RUST_LOG` overrides the configured level when set. Initializing twice in
/// one process fails, which the error surfaces rather than panicking.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] when a global subscriber is
/// already installed, and [`TelemetryError::InvalidConfig`] for an
/// unparsable level.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level));
    let filter = filter.map_err(|err| TelemetryError::InvalidConfig(err.to_string()))?;

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.include_target)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(config.include_target)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError::LoggingInit(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production_shaped() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_preset() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_disabled_logging_is_a_no_op() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
        // A second call must also succeed: nothing was installed.
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_invalid_level_is_reported() {
        let config = LogConfig {
            level: "definitely not a level,,,[".to_string(),
            ..LogConfig::default()
        };
        // Only fails when RUST_LOG is unset; either way it must not panic.
        let _ = init_logging(&config);
    }
}
