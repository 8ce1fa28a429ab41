//! Rate limiting stage.
//!
//! Derives the client key and consults the shared [`RateLimiter`]. The key
//! is `"<user_id>:<ip>"` once a principal exists so an authenticated
//! client's budget follows them across addresses; without a principal the
//! bare IP is the key, so anonymous traffic still counts per address in
//! deployments that admit it.

use crate::stage::{Stage, StageFlow, StageKind};
use cerberus_admission::{RateDecision, RateLimiter};
use cerberus_core::{AdmissionContext, BoxFuture, GateError, GateResult, RawRequest};
use std::sync::Arc;

/// Stage 4: sliding-window rate limiting.
#[derive(Debug, Clone)]
pub struct RateLimitStage {
    limiter: Arc<RateLimiter>,
}

impl RateLimitStage {
    /// Creates the stage over a shared limiter.
    #[must_use]
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }

    /// Derives the client key for this request.
    fn client_key(ctx: &AdmissionContext, request: &RawRequest) -> String {
        match ctx.principal() {
            Some(principal) => format!("{}:{}", principal.user_id, request.ip_address()),
            None => request.ip_address().to_string(),
        }
    }
}

impl Stage for RateLimitStage {
    fn name(&self) -> &'static str {
        StageKind::RateLimit.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>> {
        Box::pin(async move {
            let key = Self::client_key(ctx, request);

            match self.limiter.check(&key) {
                RateDecision::Allowed { remaining, .. } => {
                    tracing::debug!(key = %key, remaining, "request admitted by rate limiter");
                    Ok(StageFlow::Continue)
                }
                RateDecision::Limited { limit, retry_after } => {
                    tracing::warn!(
                        key = %key,
                        limit,
                        retry_after_secs = retry_after.as_secs(),
                        "rate limit exceeded"
                    );
                    Err(GateError::rate_limited(
                        format!("client exceeded {limit} requests in the current window"),
                        Some(retry_after.as_secs().max(1)),
                    ))
                }
            }
        })
    }
}
