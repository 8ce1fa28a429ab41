//! Idempotency stage.
//!
//! When the request carries an idempotency key that already has a stored
//! outcome, the stage short-circuits the pipeline with that outcome
//! verbatim, whatever the current request's body or headers say. A key
//! with no stored outcome is recorded in the context so the orchestrator
//! can store the eventual result; no key means the pipeline always runs
//! fully and nothing is cached.

use crate::stage::{Stage, StageFlow, StageKind};
use cerberus_admission::IdempotencyStore;
use cerberus_config::IdempotencyConfig;
use cerberus_core::{AdmissionContext, BoxFuture, GateResult, RawRequest};
use std::sync::Arc;

/// Stage 5: idempotent replay check.
#[derive(Debug, Clone)]
pub struct IdempotencyStage {
    store: Arc<IdempotencyStore>,
    header: String,
    enabled: bool,
}

impl IdempotencyStage {
    /// Creates the stage over a shared store.
    #[must_use]
    pub fn new(store: Arc<IdempotencyStore>, config: &IdempotencyConfig) -> Self {
        Self {
            store,
            header: config.header.clone(),
            enabled: config.enabled,
        }
    }
}

impl Stage for IdempotencyStage {
    fn name(&self) -> &'static str {
        StageKind::Idempotency.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>> {
        Box::pin(async move {
            if !self.enabled {
                return Ok(StageFlow::Continue);
            }

            let Some(key) = request.header(&self.header).filter(|k| !k.is_empty()) else {
                return Ok(StageFlow::Continue);
            };

            if let Some(stored) = self.store.check(key) {
                tracing::debug!(key, "idempotent replay, returning stored outcome");
                return Ok(StageFlow::Replay(stored));
            }

            ctx.set_idempotency_key(key);
            Ok(StageFlow::Continue)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerberus_core::request::headers;
    use cerberus_core::{AdmissionOutcome, Principal, RawRequest};

    fn stored_outcome() -> AdmissionOutcome {
        let mut ctx = AdmissionContext::new();
        ctx.set_tenant_id("org1");
        ctx.set_principal(Principal::new("u1", vec![]));
        ctx.set_locale("en-US");
        ctx.set_timezone("UTC");
        AdmissionOutcome::accepted(ctx.request_context().unwrap())
    }

    fn request_with_key(key: &str) -> RawRequest {
        RawRequest::builder()
            .header(headers::IDEMPOTENCY_KEY, key)
            .build()
    }

    fn stage_with_store() -> (IdempotencyStage, Arc<IdempotencyStore>) {
        let store = Arc::new(IdempotencyStore::new());
        let stage = IdempotencyStage::new(Arc::clone(&store), &IdempotencyConfig::default());
        (stage, store)
    }

    #[tokio::test]
    async fn test_no_key_continues_without_recording() {
        let (stage, _store) = stage_with_store();
        let mut ctx = AdmissionContext::new();

        let flow = stage
            .process(&mut ctx, &RawRequest::builder().build())
            .await
            .unwrap();

        assert_eq!(flow, StageFlow::Continue);
        assert!(ctx.idempotency_key().is_none());
    }

    #[tokio::test]
    async fn test_fresh_key_is_recorded_for_the_store_step() {
        let (stage, _store) = stage_with_store();
        let mut ctx = AdmissionContext::new();

        let flow = stage
            .process(&mut ctx, &request_with_key("key-1"))
            .await
            .unwrap();

        assert_eq!(flow, StageFlow::Continue);
        assert_eq!(ctx.idempotency_key(), Some("key-1"));
    }

    #[tokio::test]
    async fn test_known_key_replays_stored_outcome() {
        let (stage, store) = stage_with_store();
        let outcome = stored_outcome();
        store.store("key-1", outcome.clone());

        let mut ctx = AdmissionContext::new();
        let flow = stage
            .process(&mut ctx, &request_with_key("key-1"))
            .await
            .unwrap();

        assert_eq!(flow, StageFlow::Replay(outcome));
        // Replays must not trigger a second store.
        assert!(ctx.idempotency_key().is_none());
    }

    #[tokio::test]
    async fn test_disabled_stage_ignores_keys() {
        let store = Arc::new(IdempotencyStore::new());
        store.store("key-1", stored_outcome());
        let config = IdempotencyConfig {
            enabled: false,
            ..IdempotencyConfig::default()
        };
        let stage = IdempotencyStage::new(store, &config);

        let mut ctx = AdmissionContext::new();
        let flow = stage
            .process(&mut ctx, &request_with_key("key-1"))
            .await
            .unwrap();

        assert_eq!(flow, StageFlow::Continue);
        assert!(ctx.idempotency_key().is_none());
    }

    #[test]
    fn test_stage_name() {
        let (stage, _store) = stage_with_store();
        assert_eq!(stage.name(), "idempotency");
    }
}
