//! Test fixtures for the admission pipeline.
//!
//! These helpers keep collaborator mocking out of every test module: a
//! [`StaticAuthVerifier`] backed by an in-memory token table, and canned
//! request builders for the common shapes.

use crate::identity::{AuthVerifier, BoxFuture, Principal};
use crate::request::{headers, RawRequest};
use std::collections::HashMap;

/// An [`AuthVerifier`] backed by a fixed token table.
///
/// # Example
///
/// ```
/// use cerberus_core::fixtures::StaticAuthVerifier;
/// use cerberus_core::{AuthVerifier, Principal};
///
/// # tokio_test::block_on(async {
/// let verifier = StaticAuthVerifier::new()
///     .with_token("good-token", Principal::new("u1", vec!["learner".to_string()]));
///
/// assert!(verifier.verify("good-token").await.is_some());
/// assert!(verifier.verify("expired").await.is_none());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAuthVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticAuthVerifier {
    /// Creates an empty verifier that rejects every token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token-to-principal mapping.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

impl AuthVerifier for StaticAuthVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<Principal>> {
        let principal = self.tokens.get(token).cloned();
        Box::pin(async move { principal })
    }
}

/// Builds a request carrying the standard admission headers.
///
/// Tenant `org1`, bearer token `good-token`, IP `1.2.3.4`: the shape most
/// pipeline tests start from.
#[must_use]
pub fn admitted_request() -> RawRequest {
    RawRequest::builder()
        .method("GET")
        .endpoint("/items")
        .header(headers::TENANT_PRIMARY, "org1")
        .header(headers::AUTHORIZATION, "Bearer good-token")
        .ip_address("1.2.3.4")
        .user_agent("cerberus-tests/0.1")
        .build()
}

/// Builds the verifier that accepts [`admitted_request`]'s token.
#[must_use]
pub fn learner_verifier() -> StaticAuthVerifier {
    StaticAuthVerifier::new().with_token(
        "good-token",
        Principal::new("u1", vec!["learner".to_string()]).with_tenant("org1"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_verifier_lookup() {
        let verifier = learner_verifier();

        let principal = verifier.verify("good-token").await.unwrap();
        assert_eq!(principal.user_id, "u1");
        assert!(principal.has_role("learner"));

        assert!(verifier.verify("bad-token").await.is_none());
    }

    #[test]
    fn test_admitted_request_carries_admission_headers() {
        let request = admitted_request();
        assert_eq!(request.header(headers::TENANT_PRIMARY), Some("org1"));
        assert_eq!(
            request.header(headers::AUTHORIZATION),
            Some("Bearer good-token")
        );
        assert_eq!(request.ip_address(), "1.2.3.4");
    }
}
