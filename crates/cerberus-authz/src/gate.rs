//! The permission gate.
//!
//! Invoked by callers of the pipeline after admission, for the endpoints
//! that need an object-level check beyond authentication. Not a mandatory
//! stage: plenty of endpoints need nothing past a valid principal.

use crate::action::{PermissionAction, ResourceKind};
use crate::checker::PermissionChecker;
use cerberus_core::{GateError, GateResult, Principal};
use std::sync::Arc;

/// RBAC capability delegating decisions to a [`PermissionChecker`].
///
/// A principal is authorized when *any* of its roles is granted the
/// requested action; the gate fails with [`GateError::Forbidden`] when every
/// role is denied.
///
/// # Example
///
/// ```
/// use cerberus_authz::{PermissionAction, PermissionGate, ResourceKind, StaticPermissionChecker};
/// use cerberus_core::Principal;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let gate = PermissionGate::new(Arc::new(
///     StaticPermissionChecker::learning_platform_defaults(),
/// ));
/// let learner = Principal::new("u1", vec!["learner".to_string()]);
///
/// assert!(gate
///     .authorize(&learner, PermissionAction::Read, ResourceKind::LearningItem, None, "org1")
///     .await
///     .is_ok());
/// assert!(gate
///     .authorize(&learner, PermissionAction::Delete, ResourceKind::User, None, "org1")
///     .await
///     .is_err());
/// # });
/// ```
pub struct PermissionGate {
    checker: Arc<dyn PermissionChecker>,
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate").finish_non_exhaustive()
    }
}

impl PermissionGate {
    /// Creates a gate delegating to the given checker.
    #[must_use]
    pub fn new(checker: Arc<dyn PermissionChecker>) -> Self {
        Self { checker }
    }

    /// Authorizes `principal` to perform `action` on `resource` in
    /// `tenant_id`.
    ///
    /// Checks each of the principal's roles in order and succeeds on the
    /// first grant.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&str>,
        tenant_id: &str,
    ) -> GateResult<()> {
        for role in &principal.roles {
            if self
                .checker
                .has_permission(
                    &principal.user_id,
                    role,
                    action,
                    resource,
                    resource_id,
                    Some(tenant_id),
                )
                .await
            {
                tracing::debug!(
                    principal = %principal.log_id(),
                    role,
                    %action,
                    %resource,
                    "permission granted"
                );
                return Ok(());
            }
        }

        tracing::debug!(
            principal = %principal.log_id(),
            %action,
            %resource,
            "permission denied"
        );
        Err(GateError::forbidden_action(
            format!(
                "no role of {} permits {action} on {resource}",
                principal.log_id()
            ),
            action.as_str(),
        ))
    }

    /// Convenience boolean form of [`PermissionGate::authorize`].
    pub async fn check(
        &self,
        principal: &Principal,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&str>,
        tenant_id: &str,
    ) -> bool {
        self.authorize(principal, action, resource, resource_id, tenant_id)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::StaticPermissionChecker;
    use cerberus_core::ErrorCategory;

    fn gate() -> PermissionGate {
        PermissionGate::new(Arc::new(StaticPermissionChecker::learning_platform_defaults()))
    }

    #[tokio::test]
    async fn test_any_granting_role_suffices() {
        let principal = Principal::new("u1", vec!["learner".to_string(), "admin".to_string()]);
        assert!(gate()
            .authorize(&principal, PermissionAction::Delete, ResourceKind::User, None, "org1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_denied_is_forbidden() {
        let principal = Principal::new("u1", vec!["learner".to_string()]);
        let err = gate()
            .authorize(&principal, PermissionAction::Delete, ResourceKind::User, None, "org1")
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Forbidden);
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[tokio::test]
    async fn test_roleless_principal_is_denied() {
        let principal = Principal::new("u1", vec![]);
        assert!(!gate()
            .check(&principal, PermissionAction::Read, ResourceKind::User, None, "org1")
            .await);
    }
}
