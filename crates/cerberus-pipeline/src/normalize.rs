//! Failure normalization.
//!
//! Every failure the pipeline can produce funnels through here on its way
//! out. The mapping is total: each [`GateError`] variant maps to exactly one
//! category and status code, and anything that is not a [`GateError`]
//! (a panic-adjacent surprise from a collaborator, say) maps to
//! `SystemError` with status 500. Nothing is silently swallowed.

use cerberus_core::{GateError, NormalizedError};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

/// Maps any pipeline failure into the uniform [`NormalizedError`] envelope.
///
/// # Example
///
/// ```
/// use cerberus_core::{ErrorCategory, GateError};
/// use cerberus_pipeline::ErrorNormalizer;
///
/// let normalizer = ErrorNormalizer::default();
/// let normalized = normalizer.normalize(&GateError::rate_limited("slow down", Some(30)));
///
/// assert_eq!(normalized.category, ErrorCategory::RateLimitExceeded);
/// assert_eq!(normalized.status_code, 429);
/// assert_eq!(normalized.details["retry_after_seconds"], 30);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorNormalizer {
    context_label: String,
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new("request admission")
    }
}

impl ErrorNormalizer {
    /// Creates a normalizer labeling failures with the given context.
    #[must_use]
    pub fn new(context_label: impl Into<String>) -> Self {
        Self {
            context_label: context_label.into(),
        }
    }

    /// Normalizes a typed pipeline failure.
    #[must_use]
    pub fn normalize(&self, error: &GateError) -> NormalizedError {
        NormalizedError {
            error_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind: error.kind().to_string(),
            category: error.category(),
            message: error.to_string(),
            context: self.context_label.clone(),
            status_code: error.status_code().as_u16(),
            details: Self::details(error),
        }
    }

    /// Normalizes a failure that is not a [`GateError`].
    ///
    /// The catch-all for unrecognized failure types: always `SystemError`,
    /// always 500, with the original message kept for diagnostics.
    #[must_use]
    pub fn normalize_unexpected(&self, error: &anyhow::Error) -> NormalizedError {
        self.normalize(&GateError::internal(format!("unexpected failure: {error}")))
    }

    /// Diagnostic details per failure variant.
    fn details(error: &GateError) -> Value {
        match error {
            GateError::Validation {
                field: Some(field), ..
            } => json!({ "field": field }),
            GateError::Forbidden {
                action: Some(action),
                ..
            } => json!({ "action": action }),
            GateError::NotFound {
                resource_kind: Some(kind),
                resource_id: Some(id),
                ..
            } => json!({ "resource_kind": kind, "resource_id": id }),
            GateError::RateLimited {
                retry_after_seconds: Some(seconds),
                ..
            } => json!({ "retry_after_seconds": seconds }),
            GateError::Internal {
                source: Some(source),
                ..
            } => json!({ "source": source.to_string() }),
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerberus_core::ErrorCategory;

    fn normalizer() -> ErrorNormalizer {
        ErrorNormalizer::default()
    }

    /// One failure of every variant, for totality checks.
    fn every_failure() -> Vec<GateError> {
        vec![
            GateError::missing_tenant("m"),
            GateError::validation_field("m", "f"),
            GateError::unauthenticated("m"),
            GateError::forbidden_action("m", "delete"),
            GateError::not_found_resource("user", "u9"),
            GateError::rate_limited("m", Some(5)),
            GateError::internal("m"),
        ]
    }

    #[test]
    fn test_mapping_is_total() {
        let expected = [400, 400, 401, 403, 404, 429, 500];

        for (error, status) in every_failure().iter().zip(expected) {
            let normalized = normalizer().normalize(error);
            assert_eq!(normalized.status_code, status, "for {error}");
            assert_eq!(normalized.category, error.category());
            assert_eq!(normalized.kind, error.kind());
            assert_eq!(normalized.context, "request admission");
        }
    }

    #[test]
    fn test_error_ids_are_unique_per_occurrence() {
        let error = GateError::unauthenticated("m");
        let a = normalizer().normalize(&error);
        let b = normalizer().normalize(&error);
        assert_ne!(a.error_id, b.error_id);
    }

    #[test]
    fn test_details_carry_retry_hint() {
        let normalized = normalizer().normalize(&GateError::rate_limited("m", Some(30)));
        assert_eq!(normalized.details["retry_after_seconds"], 30);
    }

    #[test]
    fn test_details_carry_resource_refs() {
        let normalized = normalizer().normalize(&GateError::not_found_resource("session", "s1"));
        assert_eq!(normalized.details["resource_kind"], "session");
        assert_eq!(normalized.details["resource_id"], "s1");
    }

    #[test]
    fn test_unexpected_failures_become_system_errors() {
        let surprise = anyhow::anyhow!("collaborator fell over");
        let normalized = normalizer().normalize_unexpected(&surprise);

        assert_eq!(normalized.category, ErrorCategory::SystemError);
        assert_eq!(normalized.status_code, 500);
        assert!(normalized.message.contains("collaborator fell over"));
    }

    #[test]
    fn test_custom_context_label() {
        let normalized =
            ErrorNormalizer::new("permission check").normalize(&GateError::forbidden("m"));
        assert_eq!(normalized.context, "permission check");
    }
}
