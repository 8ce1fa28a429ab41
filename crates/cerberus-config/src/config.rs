//! Main configuration types.
//!
//! [`CerberusConfig`] is the root type containing one section per pipeline
//! concern. Every section has serde defaults, so a partial file configures
//! only what it names.

use serde::{Deserialize, Serialize};

/// Complete admission pipeline configuration.
///
/// # Example
///
/// ```
/// use cerberus_config::CerberusConfig;
///
/// let config = CerberusConfig::default();
/// assert_eq!(config.rate_limit.max_requests, 100);
/// assert_eq!(config.tenant.primary_header, "x-organization-id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CerberusConfig {
    /// Tenant resolution.
    #[serde(default)]
    pub tenant: TenantConfig,

    /// Correlation id handling.
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Idempotent replay protection.
    #[serde(default)]
    pub idempotency: IdempotencyConfig,

    /// Locale and timezone detection.
    #[serde(default)]
    pub locale: LocaleConfig,
}

impl CerberusConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidValue`] when a limit is zero or
    /// a header name is empty.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(crate::ConfigError::invalid_value(
                "rate_limit.max_requests",
                "must be greater than zero",
            ));
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(crate::ConfigError::invalid_value(
                "rate_limit.window_seconds",
                "must be greater than zero",
            ));
        }

        let headers = [
            ("tenant.primary_header", &self.tenant.primary_header),
            ("tenant.alias_header", &self.tenant.alias_header),
            ("correlation.header", &self.correlation.header),
            ("idempotency.header", &self.idempotency.header),
            ("locale.language_header", &self.locale.language_header),
            ("locale.timezone_header", &self.locale.timezone_header),
        ];
        for (field, value) in headers {
            if value.trim().is_empty() {
                return Err(crate::ConfigError::invalid_value(
                    field,
                    "header name must not be empty",
                ));
            }
        }

        Ok(())
    }
}

/// Tenant resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    /// Header consulted first for the tenant identifier.
    #[serde(default = "defaults::tenant_primary_header")]
    pub primary_header: String,

    /// Header consulted when the primary is absent.
    #[serde(default = "defaults::tenant_alias_header")]
    pub alias_header: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            primary_header: defaults::tenant_primary_header(),
            alias_header: defaults::tenant_alias_header(),
        }
    }
}

/// Correlation id settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrelationConfig {
    /// Header carrying an inbound correlation id.
    #[serde(default = "defaults::correlation_header")]
    pub header: String,

    /// Whether to reuse valid inbound correlation ids.
    ///
    /// Disable for edge deployments that must not trust client-supplied
    /// ids.
    #[serde(default = "defaults::correlation_trust_incoming")]
    pub trust_incoming: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header: defaults::correlation_header(),
            trust_incoming: defaults::correlation_trust_incoming(),
        }
    }
}

/// Rate limiting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per client key per window.
    #[serde(default = "defaults::rate_limit_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds.
    #[serde(default = "defaults::rate_limit_window_seconds")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: defaults::rate_limit_max_requests(),
            window_seconds: defaults::rate_limit_window_seconds(),
        }
    }
}

/// Idempotency settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdempotencyConfig {
    /// Header carrying the client idempotency key.
    #[serde(default = "defaults::idempotency_header")]
    pub header: String,

    /// Whether replay protection is active.
    #[serde(default = "defaults::idempotency_enabled")]
    pub enabled: bool,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            header: defaults::idempotency_header(),
            enabled: defaults::idempotency_enabled(),
        }
    }
}

/// Locale and timezone settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Locale assumed when the request names none.
    #[serde(default = "defaults::default_locale")]
    pub default_locale: String,

    /// Timezone assumed when the request names none.
    #[serde(default = "defaults::default_timezone")]
    pub default_timezone: String,

    /// Header carrying the locale preference.
    #[serde(default = "defaults::language_header")]
    pub language_header: String,

    /// Header carrying the client timezone.
    #[serde(default = "defaults::timezone_header")]
    pub timezone_header: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_locale: defaults::default_locale(),
            default_timezone: defaults::default_timezone(),
            language_header: defaults::language_header(),
            timezone_header: defaults::timezone_header(),
        }
    }
}

mod defaults {
    pub fn tenant_primary_header() -> String {
        "x-organization-id".to_string()
    }
    pub fn tenant_alias_header() -> String {
        "x-tenant-id".to_string()
    }
    pub fn correlation_header() -> String {
        "x-correlation-id".to_string()
    }
    pub const fn correlation_trust_incoming() -> bool {
        true
    }
    pub const fn rate_limit_max_requests() -> u32 {
        100
    }
    pub const fn rate_limit_window_seconds() -> u64 {
        3600
    }
    pub fn idempotency_header() -> String {
        "idempotency-key".to_string()
    }
    pub const fn idempotency_enabled() -> bool {
        true
    }
    pub fn default_locale() -> String {
        "en-US".to_string()
    }
    pub fn default_timezone() -> String {
        "UTC".to_string()
    }
    pub fn language_header() -> String {
        "accept-language".to_string()
    }
    pub fn timezone_header() -> String {
        "x-timezone".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CerberusConfig::default();
        assert_eq!(config.tenant.primary_header, "x-organization-id");
        assert_eq!(config.tenant.alias_header, "x-tenant-id");
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_seconds, 3600);
        assert!(config.idempotency.enabled);
        assert_eq!(config.locale.default_locale, "en-US");
        assert_eq!(config.locale.default_timezone, "UTC");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: CerberusConfig = toml::from_str(
            r#"
            [rate_limit]
            max_requests = 3
            window_seconds = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.tenant.primary_header, "x-organization-id");
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<CerberusConfig, _> = toml::from_str(
            r#"
            [rate_limit]
            max_requets = 3
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = CerberusConfig::default();
        config.rate_limit.max_requests = 0;
        assert!(config.validate().is_err());

        let mut config = CerberusConfig::default();
        config.rate_limit.window_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_header_names() {
        let mut config = CerberusConfig::default();
        config.tenant.primary_header = String::new();
        assert!(config.validate().is_err());
    }
}
