//! Pipeline outcome envelopes.
//!
//! The pipeline always returns one of two shapes: a success envelope with
//! the enriched [`RequestContext`], or a failure envelope with the
//! [`NormalizedError`]. Both carry `success` so transport layers can branch
//! without inspecting the payload, and both round-trip through serde so
//! idempotent replays return the stored envelope verbatim.

use crate::context::RequestContext;
use crate::error::NormalizedError;
use serde::{Deserialize, Serialize};

/// Message attached to admitted requests.
const ADMITTED_MESSAGE: &str = "request admitted";

/// Message attached to rejected requests.
const REJECTED_MESSAGE: &str = "request rejected during admission";

/// The success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedRequest {
    /// Always `true`.
    pub success: bool,
    /// The enriched request context.
    pub context: RequestContext,
    /// Human-readable summary.
    pub message: String,
}

/// The failure envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRequest {
    /// Always `false`.
    pub success: bool,
    /// The normalized failure.
    pub error: NormalizedError,
    /// Human-readable summary.
    pub message: String,
}

/// The result of running one request through the admission pipeline.
///
/// # Example
///
/// ```
/// use cerberus_core::{AdmissionContext, AdmissionOutcome, Principal};
///
/// let mut ctx = AdmissionContext::new();
/// ctx.set_tenant_id("org1");
/// ctx.set_principal(Principal::new("u1", vec![]));
/// ctx.set_locale("en-US");
/// ctx.set_timezone("UTC");
///
/// let outcome = AdmissionOutcome::accepted(ctx.request_context().unwrap());
/// assert!(outcome.is_success());
/// assert_eq!(outcome.status_code(), 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdmissionOutcome {
    /// The request passed every admission stage.
    Accepted(AcceptedRequest),
    /// Some stage rejected the request.
    Rejected(RejectedRequest),
}

impl AdmissionOutcome {
    /// Wraps an enriched context in the success envelope.
    #[must_use]
    pub fn accepted(context: RequestContext) -> Self {
        Self::Accepted(AcceptedRequest {
            success: true,
            context,
            message: ADMITTED_MESSAGE.to_string(),
        })
    }

    /// Wraps a normalized failure in the failure envelope.
    #[must_use]
    pub fn rejected(error: NormalizedError) -> Self {
        Self::Rejected(RejectedRequest {
            success: false,
            error,
            message: REJECTED_MESSAGE.to_string(),
        })
    }

    /// Returns whether the request was admitted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns the enriched context, when admitted.
    #[must_use]
    pub const fn context(&self) -> Option<&RequestContext> {
        match self {
            Self::Accepted(accepted) => Some(&accepted.context),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the normalized failure, when rejected.
    #[must_use]
    pub const fn error(&self) -> Option<&NormalizedError> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejected) => Some(&rejected.error),
        }
    }

    /// Returns the HTTP status code for this outcome (200 on success).
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Accepted(_) => 200,
            Self::Rejected(rejected) => rejected.error.status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AdmissionContext;
    use crate::error::ErrorCategory;
    use crate::identity::Principal;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_context() -> RequestContext {
        let mut ctx = AdmissionContext::new();
        ctx.set_tenant_id("org1");
        ctx.set_principal(Principal::new("u1", vec!["learner".to_string()]));
        ctx.set_locale("en-US");
        ctx.set_timezone("UTC");
        ctx.request_context().unwrap()
    }

    fn sample_error() -> NormalizedError {
        NormalizedError {
            error_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind: "RateLimited".to_string(),
            category: ErrorCategory::RateLimitExceeded,
            message: "rate limit exceeded".to_string(),
            context: "request admission".to_string(),
            status_code: 429,
            details: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_accepted_envelope_shape() {
        let outcome = AdmissionOutcome::accepted(sample_context());
        assert!(outcome.is_success());
        assert_eq!(outcome.status_code(), 200);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["context"]["tenant_id"], "org1");
        assert_eq!(json["message"], "request admitted");
    }

    #[test]
    fn test_rejected_envelope_shape() {
        let outcome = AdmissionOutcome::rejected(sample_error());
        assert!(!outcome.is_success());
        assert_eq!(outcome.status_code(), 429);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["category"], "rate_limit_exceeded");
    }

    #[test]
    fn test_round_trip_preserves_exact_value() {
        let outcome = AdmissionOutcome::rejected(sample_error());
        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: AdmissionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_accessors() {
        let accepted = AdmissionOutcome::accepted(sample_context());
        assert!(accepted.context().is_some());
        assert!(accepted.error().is_none());

        let rejected = AdmissionOutcome::rejected(sample_error());
        assert!(rejected.context().is_none());
        assert!(rejected.error().is_some());
    }
}
