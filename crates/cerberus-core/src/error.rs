//! Failure types for the admission pipeline.
//!
//! Every stage failure is a [`GateError`]; the orchestrator never lets one
//! escape raw. At the boundary each failure is mapped, totally, into a
//! [`NormalizedError`], the single uniform envelope callers receive
//! regardless of which stage failed.

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using [`GateError`].
pub type GateResult<T> = Result<T, GateError>;

/// Categories of admission failures.
///
/// Each category maps to exactly one HTTP status code; the mapping is the
/// contract every caller of the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No tenant identifier could be resolved from the request.
    MissingTenant,
    /// Request input failed validation.
    ValidationError,
    /// Missing, malformed, expired, or revoked credentials.
    Unauthenticated,
    /// Authenticated but not permitted.
    Forbidden,
    /// Target resource does not exist.
    ResourceNotFound,
    /// Client exceeded its admission rate.
    RateLimitExceeded,
    /// Catch-all for unexpected failures.
    SystemError,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingTenant | Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::SystemError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns all categories, for totality checks.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::MissingTenant,
            Self::ValidationError,
            Self::Unauthenticated,
            Self::Forbidden,
            Self::ResourceNotFound,
            Self::RateLimitExceeded,
            Self::SystemError,
        ]
    }
}

/// Standard failure type for the admission pipeline.
///
/// `GateError` provides structured failures with a category, a stable HTTP
/// status code, and enough detail for the normalized envelope.
///
/// # Example
///
/// ```
/// use cerberus_core::{ErrorCategory, GateError};
///
/// fn resolve_tenant(header: Option<&str>) -> Result<String, GateError> {
///     header
///         .map(ToString::to_string)
///         .ok_or_else(|| GateError::missing_tenant("no tenant header present"))
/// }
///
/// let err = resolve_tenant(None).unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::MissingTenant);
/// ```
#[derive(Error, Debug)]
pub enum GateError {
    /// No tenant could be resolved from the request headers.
    #[error("missing tenant: {message}")]
    MissingTenant {
        /// Human-readable error message.
        message: String,
    },

    /// Request input failed validation.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// The offending field, when known.
        field: Option<String>,
    },

    /// Authentication failed.
    #[error("authentication required: {message}")]
    Unauthenticated {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Human-readable error message.
        message: String,
        /// The denied action, when known.
        action: Option<String>,
    },

    /// Resource not found.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The kind of resource that was not found.
        resource_kind: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// Client exceeded its admission rate.
    #[error("rate limit exceeded: {message}")]
    RateLimited {
        /// Human-readable error message.
        message: String,
        /// Seconds until the client's window reopens.
        retry_after_seconds: Option<u64>,
    },

    /// Internal failure.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (diagnostics only, never sent to clients
        /// verbatim).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl GateError {
    /// Creates a missing-tenant error.
    #[must_use]
    pub fn missing_tenant(message: impl Into<String>) -> Self {
        Self::MissingTenant {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a validation error naming the offending field.
    #[must_use]
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates an unauthenticated error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            action: None,
        }
    }

    /// Creates a forbidden error naming the denied action.
    #[must_use]
    pub fn forbidden_action(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            action: Some(action.into()),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_kind: None,
            resource_id: None,
        }
    }

    /// Creates a not-found error with resource context.
    #[must_use]
    pub fn not_found_resource(
        resource_kind: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_kind = resource_kind.into();
        let resource_id = resource_id.into();
        Self::NotFound {
            message: format!("{resource_kind} '{resource_id}' not found"),
            resource_kind: Some(resource_kind),
            resource_id: Some(resource_id),
        }
    }

    /// Creates a rate-limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>, retry_after_seconds: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_seconds,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingTenant { .. } => ErrorCategory::MissingTenant,
            Self::Validation { .. } => ErrorCategory::ValidationError,
            Self::Unauthenticated { .. } => ErrorCategory::Unauthenticated,
            Self::Forbidden { .. } => ErrorCategory::Forbidden,
            Self::NotFound { .. } => ErrorCategory::ResourceNotFound,
            Self::RateLimited { .. } => ErrorCategory::RateLimitExceeded,
            Self::Internal { .. } => ErrorCategory::SystemError,
        }
    }

    /// Returns the HTTP status code for this failure.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }

    /// Returns the failure type name, as carried in the error envelope.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingTenant { .. } => "MissingTenant",
            Self::Validation { .. } => "Validation",
            Self::Unauthenticated { .. } => "Unauthenticated",
            Self::Forbidden { .. } => "Forbidden",
            Self::NotFound { .. } => "NotFound",
            Self::RateLimited { .. } => "RateLimited",
            Self::Internal { .. } => "Internal",
        }
    }
}

/// The uniform failure envelope returned to callers.
///
/// Every failure the pipeline can produce maps into this shape; callers
/// never see a raw internal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedError {
    /// Unique identifier for this occurrence.
    pub error_id: Uuid,
    /// When the failure was normalized.
    pub timestamp: DateTime<Utc>,
    /// The failure type name (e.g. `RateLimited`).
    #[serde(rename = "type")]
    pub kind: String,
    /// The failure category.
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Label of the processing context the failure surfaced in.
    pub context: String,
    /// Stable HTTP status code.
    pub status_code: u16,
    /// Diagnostic details (field names, retry hints, resource refs).
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub details: Value,
}
