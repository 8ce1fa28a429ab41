//! # Cerberus
//!
//! **Multi-tenant request admission pipeline for the Lyceum platform**
//!
//! Cerberus sits between the transport and the domain handlers: every
//! inbound request is admitted, or rejected with a uniform error envelope,
//! before any handler runs.
//!
//! - 🏢 **Tenant resolution** - every request resolves to exactly one
//!   organization before anything else is decided about it
//! - 🔑 **Bearer authentication** - delegated to an opaque `AuthVerifier`
//! - 🚦 **Sliding-window rate limiting** - per client key, client-local
//!   windows, concurrent-safe counters
//! - 🔁 **Idempotent replay protection** - first-write-wins outcome cache
//! - 📜 **Append-only audit trail** - one entry per processed request,
//!   success or failure
//! - 🧾 **Uniform failures** - every rejection is one normalized shape with
//!   a stable status code
//!
//! ## Quick Start
//!
//! ```
//! use cerberus::prelude::*;
//! use std::sync::Arc;
//!
//! # use cerberus::core::fixtures::{admitted_request, learner_verifier};
//! # tokio_test::block_on(async {
//! let processor = RequestProcessor::builder()
//!     .verifier(Arc::new(learner_verifier()))
//!     .build();
//!
//! let outcome = processor.process(&admitted_request()).await;
//! assert!(outcome.is_success());
//! # });
//! ```
//!
//! ## Architecture
//!
//! The admission stages run in a fixed order that callers cannot change:
//!
//! ```text
//! Request → Correlation → Tenant → Authentication → RateLimit → Idempotency → Locale
//! ```
//!
//! Object-level authorization ([`authz::PermissionGate`]) is a capability
//! invoked after admission by the endpoints that need it, not a mandatory
//! stage.

#![doc(html_root_url = "https://docs.rs/cerberus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the workspace crates under stable module names.
pub use cerberus_admission as admission;
pub use cerberus_audit as audit;
pub use cerberus_authz as authz;
pub use cerberus_config as config;
pub use cerberus_core as core;
pub use cerberus_pipeline as pipeline;
pub use cerberus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use cerberus::prelude::*;
/// ```
pub mod prelude {
    pub use cerberus_admission::{IdempotencyStore, RateLimiter};
    pub use cerberus_audit::{AuditEntry, AuditQuery, AuditRecorder, UsageMeter};
    pub use cerberus_authz::{
        PermissionAction, PermissionChecker, PermissionGate, ResourceKind,
        StaticPermissionChecker,
    };
    pub use cerberus_config::{CerberusConfig, ConfigLoader};
    pub use cerberus_core::{
        AdmissionOutcome, AuthVerifier, CorrelationId, ErrorCategory, GateError, GateResult,
        NormalizedError, Principal, RawRequest, RequestContext,
    };
    pub use cerberus_pipeline::{ErrorNormalizer, RequestProcessor, StageKind};
    pub use cerberus_telemetry::{init_logging, LogConfig};
}
