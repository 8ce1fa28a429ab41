//! Correlation id stage.
//!
//! Reuses the inbound `X-Correlation-ID` when it parses as a UUID, so a
//! request keeps one identifier across upstream services; otherwise the
//! fresh UUID v7 the context was created with stands. Arbitrary client
//! strings are never adopted; uniqueness wins over verbatim reuse.

use crate::stage::{Stage, StageFlow, StageKind};
use cerberus_config::CorrelationConfig;
use cerberus_core::{AdmissionContext, BoxFuture, CorrelationId, GateResult, RawRequest};

/// Stage 1: correlation id reuse/generation.
#[derive(Debug, Clone)]
pub struct CorrelationStage {
    header: String,
    trust_incoming: bool,
}

impl CorrelationStage {
    /// Creates the stage from its configuration section.
    #[must_use]
    pub fn new(config: &CorrelationConfig) -> Self {
        Self {
            header: config.header.clone(),
            trust_incoming: config.trust_incoming,
        }
    }

    /// Extracts a reusable correlation id from the request, if any.
    fn extract(&self, request: &RawRequest) -> Option<CorrelationId> {
        if !self.trust_incoming {
            return None;
        }
        request.header(&self.header).and_then(CorrelationId::parse)
    }
}

impl Default for CorrelationStage {
    fn default() -> Self {
        Self::new(&CorrelationConfig::default())
    }
}

impl Stage for CorrelationStage {
    fn name(&self) -> &'static str {
        StageKind::Correlation.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>> {
        Box::pin(async move {
            if let Some(id) = self.extract(request) {
                ctx.set_correlation_id(id);
            }
            tracing::debug!(correlation_id = %ctx.correlation_id(), "correlation id assigned");
            Ok(StageFlow::Continue)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerberus_core::request::headers;
    use uuid::Uuid;

    fn request_with_id(value: &str) -> RawRequest {
        cerberus_core::RawRequest::builder()
            .header(headers::CORRELATION_ID, value)
            .build()
    }

    #[tokio::test]
    async fn test_reuses_valid_incoming_id() {
        let stage = CorrelationStage::default();
        let mut ctx = AdmissionContext::new();
        let incoming = Uuid::now_v7();

        let flow = stage
            .process(&mut ctx, &request_with_id(&incoming.to_string()))
            .await
            .unwrap();

        assert_eq!(flow, StageFlow::Continue);
        assert_eq!(*ctx.correlation_id().as_uuid(), incoming);
    }

    #[tokio::test]
    async fn test_replaces_non_uuid_incoming_id() {
        let stage = CorrelationStage::default();
        let mut ctx = AdmissionContext::new();
        let generated = ctx.correlation_id();

        stage
            .process(&mut ctx, &request_with_id("totally-opaque"))
            .await
            .unwrap();

        assert_eq!(ctx.correlation_id(), generated);
    }

    #[tokio::test]
    async fn test_generates_when_header_absent() {
        let stage = CorrelationStage::default();
        let mut ctx = AdmissionContext::new();
        let generated = ctx.correlation_id();

        stage
            .process(&mut ctx, &cerberus_core::RawRequest::builder().build())
            .await
            .unwrap();

        assert_eq!(ctx.correlation_id(), generated);
    }

    #[tokio::test]
    async fn test_untrusting_stage_ignores_incoming_id() {
        let config = CorrelationConfig {
            trust_incoming: false,
            ..CorrelationConfig::default()
        };
        let stage = CorrelationStage::new(&config);
        let mut ctx = AdmissionContext::new();
        let incoming = Uuid::now_v7();

        stage
            .process(&mut ctx, &request_with_id(&incoming.to_string()))
            .await
            .unwrap();

        assert_ne!(*ctx.correlation_id().as_uuid(), incoming);
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(CorrelationStage::default().name(), "correlation");
    }
}
