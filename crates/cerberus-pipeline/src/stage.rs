//! The admission stage contract.
//!
//! Stages implement a common `process(context, request) -> Result` shape and
//! are composed by the orchestrator as an explicit ordered list. That makes
//! stage order a testable property ([`RequestProcessor::stage_names`]
//! exposes it) instead of implicit wrapper nesting.
//!
//! [`RequestProcessor::stage_names`]: crate::RequestProcessor::stage_names

use cerberus_core::{AdmissionContext, AdmissionOutcome, BoxFuture, GateResult, RawRequest};

/// What a stage tells the orchestrator to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StageFlow {
    /// Proceed to the next stage.
    Continue,
    /// Return this previously stored outcome verbatim, skipping every
    /// remaining stage and the audit write (the original run already
    /// produced the covering entry).
    Replay(AdmissionOutcome),
}

/// One admission stage.
///
/// # Invariants
///
/// - A stage either completes (enriching the context) or fails fast with a
///   `GateError`; it never partially applies shared-state side effects.
/// - Stages must not assume any stage after them ran; they may rely on the
///   ones before them in [`StageKind`] order.
pub trait Stage: Send + Sync + 'static {
    /// Returns the unique name of this stage, used in logs and tests.
    fn name(&self) -> &'static str;

    /// Processes the request, enriching the context or failing fast.
    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>>;
}

/// The fixed admission stage order.
///
/// This enum names the order; the processor builds its stage list from it
/// and callers cannot reorder or remove entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StageKind {
    /// Stage 1: correlation id reuse/generation.
    Correlation = 1,
    /// Stage 2: tenant resolution.
    Tenant = 2,
    /// Stage 3: bearer authentication.
    Authentication = 3,
    /// Stage 4: sliding-window rate limiting.
    RateLimit = 4,
    /// Stage 5: idempotent replay check.
    Idempotency = 5,
    /// Stage 6: locale and timezone detection.
    Locale = 6,
}

impl StageKind {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Correlation => "correlation",
            Self::Tenant => "tenant",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Idempotency => "idempotency",
            Self::Locale => "locale",
        }
    }

    /// Returns all stages in pipeline order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Correlation,
            Self::Tenant,
            Self::Authentication,
            Self::RateLimit,
            Self::Idempotency,
            Self::Locale,
        ]
    }
}
