//! # Cerberus Config
//!
//! Typed configuration for the admission pipeline.
//!
//! Configuration is layered: built-in defaults, then an optional TOML or
//! JSON file, then environment variables; later layers override earlier
//! ones. The loaded [`CerberusConfig`] is validated before use.
//!
//! # Example
//!
//! ```no_run
//! use cerberus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), cerberus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("cerberus.toml")?
//!     .with_env_prefix("CERBERUS")
//!     .load()?;
//!
//! assert!(config.rate_limit.max_requests > 0);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/cerberus-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{
    CerberusConfig, CorrelationConfig, IdempotencyConfig, LocaleConfig, RateLimitConfig,
    TenantConfig,
};
pub use error::ConfigError;
pub use loader::ConfigLoader;
