//! The request processor.
//!
//! Composes the admission stages as an explicit ordered list and owns the
//! cross-cutting obligations no single stage can: normalizing failures,
//! auditing every completed run exactly once, and writing the idempotency
//! store at most once per key.

use crate::normalize::ErrorNormalizer;
use crate::stage::{Stage, StageFlow, StageKind};
use crate::stages::{
    AuthStage, CorrelationStage, IdempotencyStage, LocaleStage, RateLimitStage, TenantStage,
    TenantResolverFn,
};
use cerberus_admission::{IdempotencyStore, RateLimiter};
use cerberus_audit::{AuditEntry, AuditRecorder};
use cerberus_config::CerberusConfig;
use cerberus_core::{
    AdmissionContext, AdmissionOutcome, AuthVerifier, Clock, NormalizedError, RawRequest,
    RequestContext, SystemClock,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// The admission pipeline orchestrator.
///
/// Stage order is fixed at construction and visible through
/// [`RequestProcessor::stage_names`]; it cannot be reordered by callers.
///
/// Per run, the processor guarantees:
///
/// - every failure is normalized into the uniform envelope, with whatever
///   context fields were resolved before the failure point
/// - exactly one audit entry per completed run, except idempotent replays,
///   which append none (the original run's entry covers them)
/// - the idempotency store is written at most once per key, for success and
///   failure outcomes alike
///
/// # Example
///
/// ```
/// use cerberus_core::fixtures::{admitted_request, learner_verifier};
/// use cerberus_pipeline::RequestProcessor;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let processor = RequestProcessor::builder()
///     .verifier(Arc::new(learner_verifier()))
///     .build();
///
/// let outcome = processor.process(&admitted_request()).await;
/// assert!(outcome.is_success());
/// assert_eq!(processor.audit().len(), 1);
/// # });
/// ```
pub struct RequestProcessor {
    stages: Vec<Arc<dyn Stage>>,
    limiter: Arc<RateLimiter>,
    idempotency: Arc<IdempotencyStore>,
    audit: Arc<AuditRecorder>,
    normalizer: ErrorNormalizer,
}

impl std::fmt::Debug for RequestProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestProcessor")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

impl RequestProcessor {
    /// Creates a processor builder.
    #[must_use]
    pub fn builder() -> RequestProcessorBuilder {
        RequestProcessorBuilder::new()
    }

    /// Runs one request through the pipeline.
    ///
    /// Always returns one of the two envelope shapes; no failure escapes
    /// raw.
    pub async fn process(&self, request: &RawRequest) -> AdmissionOutcome {
        let mut ctx = AdmissionContext::new();

        for stage in &self.stages {
            match stage.process(&mut ctx, request).await {
                Ok(StageFlow::Continue) => {}
                Ok(StageFlow::Replay(outcome)) => {
                    tracing::info!(
                        correlation_id = %ctx.correlation_id(),
                        action = %request.action(),
                        "idempotent replay served from store"
                    );
                    return outcome;
                }
                Err(error) => {
                    tracing::warn!(
                        correlation_id = %ctx.correlation_id(),
                        stage = stage.name(),
                        action = %request.action(),
                        error = %error,
                        "request rejected"
                    );
                    let normalized = self.normalizer.normalize(&error);
                    return self.finish_rejected(&ctx, request, normalized);
                }
            }
        }

        match ctx.request_context() {
            Ok(context) => self.finish_accepted(&ctx, request, context),
            Err(error) => {
                let normalized = self.normalizer.normalize(&error);
                self.finish_rejected(&ctx, request, normalized)
            }
        }
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the audit trail.
    #[must_use]
    pub fn audit(&self) -> &Arc<AuditRecorder> {
        &self.audit
    }

    /// Returns the rate limiter, for snapshots and sweeping.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Returns the idempotency store, for introspection.
    #[must_use]
    pub fn idempotency_store(&self) -> &Arc<IdempotencyStore> {
        &self.idempotency
    }

    /// Audits a success and stores it under the idempotency key, if any.
    fn finish_accepted(
        &self,
        ctx: &AdmissionContext,
        request: &RawRequest,
        context: RequestContext,
    ) -> AdmissionOutcome {
        self.audit.record(AuditEntry {
            timestamp: Utc::now(),
            correlation_id: context.correlation_id,
            tenant_id: Some(context.tenant_id.clone()),
            user_id: Some(context.user_id.clone()),
            action: request.action(),
            status_code: 200,
            category: None,
            ip_address: request.ip_address().to_string(),
            user_agent: request.user_agent().to_string(),
            request_size: request.body_size(),
        });

        tracing::info!(
            correlation_id = %context.correlation_id,
            tenant_id = %context.tenant_id,
            user_id = %context.user_id,
            action = %request.action(),
            "request admitted"
        );

        let outcome = AdmissionOutcome::accepted(context);
        self.store_for_replay(ctx, &outcome);
        outcome
    }

    /// Audits a failure and stores it under the idempotency key, if any.
    fn finish_rejected(
        &self,
        ctx: &AdmissionContext,
        request: &RawRequest,
        error: NormalizedError,
    ) -> AdmissionOutcome {
        self.audit.record(AuditEntry {
            timestamp: Utc::now(),
            correlation_id: ctx.correlation_id(),
            tenant_id: ctx.tenant_id().map(ToString::to_string),
            user_id: ctx.principal().map(|p| p.user_id.clone()),
            action: request.action(),
            status_code: error.status_code,
            category: Some(error.category),
            ip_address: request.ip_address().to_string(),
            user_agent: request.user_agent().to_string(),
            request_size: request.body_size(),
        });

        let outcome = AdmissionOutcome::rejected(error);
        self.store_for_replay(ctx, &outcome);
        outcome
    }

    /// Writes the idempotency store when the request carried a fresh key.
    ///
    /// The key is only present in the context when the idempotency stage saw
    /// it *without* a stored outcome, so replays can never re-store.
    fn store_for_replay(&self, ctx: &AdmissionContext, outcome: &AdmissionOutcome) {
        if let Some(key) = ctx.idempotency_key() {
            self.idempotency.store(key, outcome.clone());
        }
    }
}

/// Builder for [`RequestProcessor`].
///
/// The verifier is required; everything else defaults to the configuration
/// defaults, fresh service instances, and the system clock.
pub struct RequestProcessorBuilder {
    verifier: Option<Arc<dyn AuthVerifier>>,
    config: CerberusConfig,
    clock: Arc<dyn Clock>,
    audit: Option<Arc<AuditRecorder>>,
    idempotency: Option<Arc<IdempotencyStore>>,
    limiter: Option<Arc<RateLimiter>>,
    tenant_resolver: Option<TenantResolverFn>,
}

impl std::fmt::Debug for RequestProcessorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestProcessorBuilder")
            .field("verifier", &self.verifier.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RequestProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestProcessorBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verifier: None,
            config: CerberusConfig::default(),
            clock: Arc::new(SystemClock::new()),
            audit: None,
            idempotency: None,
            limiter: None,
            tenant_resolver: None,
        }
    }

    /// Sets the token verifier (required).
    #[must_use]
    pub fn verifier(mut self, verifier: Arc<dyn AuthVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Sets the pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: CerberusConfig) -> Self {
        self.config = config;
        self
    }

    /// Injects a time source for the rate limiter.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shares an existing audit recorder instead of creating one.
    #[must_use]
    pub fn audit(mut self, audit: Arc<AuditRecorder>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Shares an existing idempotency store instead of creating one.
    #[must_use]
    pub fn idempotency_store(mut self, store: Arc<IdempotencyStore>) -> Self {
        self.idempotency = Some(store);
        self
    }

    /// Shares an existing rate limiter instead of creating one.
    ///
    /// Overrides the configuration's rate limit section and the injected
    /// clock.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Replaces the tenant header strategy with a custom resolver.
    #[must_use]
    pub fn tenant_resolver(mut self, resolver: TenantResolverFn) -> Self {
        self.tenant_resolver = Some(resolver);
        self
    }

    /// Builds the processor.
    ///
    /// # Panics
    ///
    /// Panics when no verifier was provided; a pipeline without one cannot
    /// authenticate anything.
    #[must_use]
    pub fn build(self) -> RequestProcessor {
        let verifier = self
            .verifier
            .expect("RequestProcessorBuilder requires a verifier");

        let limiter = self.limiter.unwrap_or_else(|| {
            Arc::new(
                RateLimiter::builder()
                    .max_requests(self.config.rate_limit.max_requests)
                    .window(Duration::from_secs(self.config.rate_limit.window_seconds))
                    .clock(self.clock)
                    .build(),
            )
        });
        let idempotency = self.idempotency.unwrap_or_default();
        let audit = self.audit.unwrap_or_default();

        let mut tenant_stage = TenantStage::new(&self.config.tenant);
        if let Some(resolver) = self.tenant_resolver {
            tenant_stage = tenant_stage.with_resolver(resolver);
        }

        // The one place the StageKind order is realized.
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(CorrelationStage::new(&self.config.correlation)),
            Arc::new(tenant_stage),
            Arc::new(AuthStage::new(verifier)),
            Arc::new(RateLimitStage::new(Arc::clone(&limiter))),
            Arc::new(IdempotencyStage::new(
                Arc::clone(&idempotency),
                &self.config.idempotency,
            )),
            Arc::new(LocaleStage::new(&self.config.locale)),
        ];
        debug_assert_eq!(stages.len(), StageKind::all().len());

        RequestProcessor {
            stages,
            limiter,
            idempotency,
            audit,
            normalizer: ErrorNormalizer::default(),
        }
    }
}
