//! Authentication stage.
//!
//! Extracts the bearer credential from the `Authorization` header and
//! delegates to the [`AuthVerifier`]. The stage owns nothing about the
//! credential itself: expiry, signatures, and revocation are the
//! verifier's concern, and any `None` answer is an unauthenticated request.

use crate::stage::{Stage, StageFlow, StageKind};
use cerberus_core::request::headers;
use cerberus_core::{AdmissionContext, AuthVerifier, BoxFuture, GateError, GateResult, RawRequest};
use std::sync::Arc;

/// The scheme prefix of an acceptable `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Stage 3: bearer authentication.
pub struct AuthStage {
    verifier: Arc<dyn AuthVerifier>,
}

impl std::fmt::Debug for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStage").finish_non_exhaustive()
    }
}

impl AuthStage {
    /// Creates the stage delegating to the given verifier.
    #[must_use]
    pub fn new(verifier: Arc<dyn AuthVerifier>) -> Self {
        Self { verifier }
    }

    /// Extracts the raw bearer token from the request.
    fn bearer_token<'r>(request: &'r RawRequest) -> GateResult<&'r str> {
        let header = request
            .header(headers::AUTHORIZATION)
            .ok_or_else(|| GateError::unauthenticated("missing authorization header"))?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| GateError::unauthenticated("authorization header is not a bearer credential"))?;

        if token.is_empty() {
            return Err(GateError::unauthenticated("empty bearer credential"));
        }
        Ok(token)
    }
}

impl Stage for AuthStage {
    fn name(&self) -> &'static str {
        StageKind::Authentication.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>> {
        Box::pin(async move {
            let token = Self::bearer_token(request)?;

            let principal = self
                .verifier
                .verify(token)
                .await
                .ok_or_else(|| GateError::unauthenticated("credential rejected by verifier"))?;

            tracing::debug!(principal = %principal.log_id(), "request authenticated");
            ctx.set_principal(principal);
            Ok(StageFlow::Continue)
        })
    }
}
