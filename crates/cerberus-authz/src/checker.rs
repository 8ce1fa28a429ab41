//! The permission-decision collaborator.
//!
//! [`PermissionChecker`] is the opaque interface the gate delegates to. The
//! shipped [`StaticPermissionChecker`] evaluates an in-memory role table,
//! enough for tests and single-node deployments; production systems put
//! their policy service behind the same trait.

use crate::action::{PermissionAction, ResourceKind};
use cerberus_core::BoxFuture;
use std::collections::{HashMap, HashSet};

/// Opaque collaborator answering "may this user, in this role, do that?".
///
/// Implementations own the role-to-permission tables and any object-level
/// rules; they should bound their own latency and surface timeouts as a
/// plain `false`.
pub trait PermissionChecker: Send + Sync + 'static {
    /// Returns whether `user_id`, acting under `role`, may perform `action`
    /// on the `resource` kind (optionally a specific `resource_id`) within
    /// `tenant_id`.
    fn has_permission<'a>(
        &'a self,
        user_id: &'a str,
        role: &'a str,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&'a str>,
        tenant_id: Option<&'a str>,
    ) -> BoxFuture<'a, bool>;
}

/// In-memory role-table checker.
///
/// Grants are `(action, resource)` pairs per role, with an optional
/// wildcard. One object-level rule is built in: a `learner` may only write
/// progress rows that belong to them.
///
/// # Example
///
/// ```
/// use cerberus_authz::{PermissionAction, PermissionChecker, ResourceKind, StaticPermissionChecker};
///
/// # tokio_test::block_on(async {
/// let checker = StaticPermissionChecker::learning_platform_defaults();
///
/// assert!(
///     checker
///         .has_permission("u1", "instructor", PermissionAction::Write, ResourceKind::LearningItem, None, None)
///         .await
/// );
/// assert!(
///     !checker
///         .has_permission("u1", "learner", PermissionAction::Delete, ResourceKind::User, None, None)
///         .await
/// );
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionChecker {
    grants: HashMap<String, HashSet<(PermissionAction, ResourceKind)>>,
    wildcard_roles: HashSet<String>,
}

impl StaticPermissionChecker {
    /// Creates a checker builder.
    #[must_use]
    pub fn builder() -> StaticPermissionCheckerBuilder {
        StaticPermissionCheckerBuilder::default()
    }

    /// The platform's default role tables: `admin`, `instructor`, `learner`.
    #[must_use]
    pub fn learning_platform_defaults() -> Self {
        use PermissionAction::{Delete, Read, Write};
        use ResourceKind::{Category, LearningItem, Organization, Progress, Session, User};

        Self::builder()
            .allow("admin", Read, User)
            .allow("admin", Write, User)
            .allow("admin", Delete, User)
            .allow("admin", Read, Organization)
            .allow("admin", Write, Organization)
            .allow("admin", Read, LearningItem)
            .allow("admin", Write, LearningItem)
            .allow("admin", Delete, LearningItem)
            .allow("admin", Read, Session)
            .allow("admin", Write, Session)
            .allow("admin", Read, Progress)
            .allow("admin", Write, Progress)
            .allow("admin", Read, Category)
            .allow("admin", Write, Category)
            .allow("admin", Delete, Category)
            .allow("instructor", Read, User)
            .allow("instructor", Read, Organization)
            .allow("instructor", Read, LearningItem)
            .allow("instructor", Write, LearningItem)
            .allow("instructor", Read, Session)
            .allow("instructor", Write, Session)
            .allow("instructor", Read, Progress)
            .allow("instructor", Read, Category)
            .allow("instructor", Write, Category)
            .allow("learner", Read, LearningItem)
            .allow("learner", Read, Session)
            .allow("learner", Write, Session)
            .allow("learner", Read, Progress)
            .allow("learner", Write, Progress)
            .allow("learner", Read, Category)
            .build()
    }

    /// Evaluates a grant synchronously.
    fn evaluate(
        &self,
        user_id: &str,
        role: &str,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&str>,
    ) -> bool {
        let granted = self.wildcard_roles.contains(role)
            || self
                .grants
                .get(role)
                .is_some_and(|grants| grants.contains(&(action, resource)));
        if !granted {
            return false;
        }

        Self::object_rules(user_id, role, action, resource, resource_id)
    }

    /// Object-level rules beyond the basic role table.
    fn object_rules(
        user_id: &str,
        role: &str,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&str>,
    ) -> bool {
        // Learners may only write their own progress rows.
        if role == "learner"
            && resource == ResourceKind::Progress
            && action == PermissionAction::Write
        {
            return resource_id.is_some_and(|id| {
                id == user_id || id.starts_with(&format!("user_{user_id}"))
            });
        }

        true
    }
}

impl PermissionChecker for StaticPermissionChecker {
    fn has_permission<'a>(
        &'a self,
        user_id: &'a str,
        role: &'a str,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&'a str>,
        _tenant_id: Option<&'a str>,
    ) -> BoxFuture<'a, bool> {
        let allowed = self.evaluate(user_id, role, action, resource, resource_id);
        Box::pin(async move { allowed })
    }
}

/// Builder for [`StaticPermissionChecker`].
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionCheckerBuilder {
    grants: HashMap<String, HashSet<(PermissionAction, ResourceKind)>>,
    wildcard_roles: HashSet<String>,
}

impl StaticPermissionCheckerBuilder {
    /// Grants a role one `(action, resource)` pair.
    #[must_use]
    pub fn allow(
        mut self,
        role: impl Into<String>,
        action: PermissionAction,
        resource: ResourceKind,
    ) -> Self {
        self.grants
            .entry(role.into())
            .or_default()
            .insert((action, resource));
        self
    }

    /// Grants a role every action on every resource.
    #[must_use]
    pub fn allow_all(mut self, role: impl Into<String>) -> Self {
        self.wildcard_roles.insert(role.into());
        self
    }

    /// Builds the checker.
    #[must_use]
    pub fn build(self) -> StaticPermissionChecker {
        StaticPermissionChecker {
            grants: self.grants,
            wildcard_roles: self.wildcard_roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn check(
        checker: &StaticPermissionChecker,
        user: &str,
        role: &str,
        action: PermissionAction,
        resource: ResourceKind,
        resource_id: Option<&str>,
    ) -> bool {
        checker
            .has_permission(user, role, action, resource, resource_id, Some("org1"))
            .await
    }

    #[tokio::test]
    async fn test_admin_can_delete_users() {
        let checker = StaticPermissionChecker::learning_platform_defaults();
        assert!(
            check(&checker, "u1", "admin", PermissionAction::Delete, ResourceKind::User, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_learner_cannot_delete_users() {
        let checker = StaticPermissionChecker::learning_platform_defaults();
        assert!(
            !check(&checker, "u1", "learner", PermissionAction::Delete, ResourceKind::User, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_unknown_role_is_denied() {
        let checker = StaticPermissionChecker::learning_platform_defaults();
        assert!(
            !check(&checker, "u1", "visitor", PermissionAction::Read, ResourceKind::User, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_learner_writes_only_their_own_progress() {
        let checker = StaticPermissionChecker::learning_platform_defaults();

        assert!(
            check(&checker, "u1", "learner", PermissionAction::Write, ResourceKind::Progress, Some("u1"))
                .await
        );
        assert!(
            check(&checker, "u1", "learner", PermissionAction::Write, ResourceKind::Progress, Some("user_u1_week3"))
                .await
        );
        assert!(
            !check(&checker, "u1", "learner", PermissionAction::Write, ResourceKind::Progress, Some("u2"))
                .await
        );
        assert!(
            !check(&checker, "u1", "learner", PermissionAction::Write, ResourceKind::Progress, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_wildcard_role() {
        let checker = StaticPermissionChecker::builder().allow_all("root").build();
        assert!(
            check(&checker, "u1", "root", PermissionAction::Execute, ResourceKind::Category, None)
                .await
        );
    }
}
