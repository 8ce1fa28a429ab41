//! Caller identity and the token-verification collaborator.
//!
//! The pipeline never inspects credentials itself: the auth stage extracts a
//! bearer token and hands it to an [`AuthVerifier`], which owns expiry,
//! signatures, and revocation. A `None` answer is simply "not authenticated".

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// A boxed future, the object-safe form collaborator traits return.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The authenticated identity attached to a request after the auth stage.
///
/// # Example
///
/// ```
/// use cerberus_core::Principal;
///
/// let principal = Principal::new("u1", vec!["learner".to_string()]);
/// assert!(principal.has_role("learner"));
/// assert_eq!(principal.log_id(), "user:u1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The authenticated user's identifier.
    pub user_id: String,
    /// Role names granted to the user.
    pub roles: Vec<String>,
    /// Tenant claim carried by the credential, when the issuer scopes tokens
    /// to an organization.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tenant_id: Option<String>,
}

impl Principal {
    /// Creates a principal with no tenant claim.
    #[must_use]
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
            tenant_id: None,
        }
    }

    /// Returns a principal with the given tenant claim.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Returns whether the principal holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never contains credential material.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.user_id)
    }
}

/// Opaque collaborator that maps a bearer credential to a principal.
///
/// Implementations own every credential concern: signature validation,
/// expiry, revocation, and any bounded timeout on remote lookups. The
/// pipeline treats `None`, whatever its cause, as an unauthenticated
/// request.
///
/// # Example
///
/// ```
/// use cerberus_core::{AuthVerifier, BoxFuture, Principal};
///
/// struct DenyAll;
///
/// impl AuthVerifier for DenyAll {
///     fn verify<'a>(&'a self, _token: &'a str) -> BoxFuture<'a, Option<Principal>> {
///         Box::pin(async { None })
///     }
/// }
/// ```
pub trait AuthVerifier: Send + Sync + 'static {
    /// Validates a raw bearer credential.
    ///
    /// Returns the principal on success, `None` for expired, malformed, or
    /// revoked credentials.
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<Principal>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role() {
        let principal = Principal::new("u1", vec!["admin".to_string(), "learner".to_string()]);
        assert!(principal.has_role("admin"));
        assert!(!principal.has_role("instructor"));
    }

    #[test]
    fn test_with_tenant() {
        let principal = Principal::new("u1", vec![]).with_tenant("org1");
        assert_eq!(principal.tenant_id.as_deref(), Some("org1"));
    }

    #[test]
    fn test_log_id_never_leaks_roles() {
        let principal = Principal::new("u42", vec!["admin".to_string()]);
        assert_eq!(principal.log_id(), "user:u42");
    }

    #[test]
    fn test_serialization_skips_absent_tenant() {
        let principal = Principal::new("u1", vec![]);
        let json = serde_json::to_string(&principal).expect("serialization should work");
        assert!(!json.contains("tenant_id"));

        let parsed: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, principal);
    }
}
