//! The typed permission vocabulary.
//!
//! Actions and resource kinds are enums shared between the gate and its
//! checker. `FromStr`/`as_str` exist for the edges (config files, audit
//! labels); everything between the edges stays typed.

use cerberus_core::GateError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a principal wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    /// Read a resource.
    Read,
    /// Create or update a resource.
    Write,
    /// Delete a resource.
    Delete,
    /// Trigger a resource's behavior (e.g. run a generation job).
    Execute,
}

impl PermissionAction {
    /// Returns the wire name of this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Execute => "execute",
        }
    }

    /// Returns all actions.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Read, Self::Write, Self::Delete, Self::Execute]
    }
}

impl std::fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            "execute" => Ok(Self::Execute),
            other => Err(GateError::validation_field(
                format!("unknown permission action '{other}'"),
                "action",
            )),
        }
    }
}

/// What a principal wants to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A platform user.
    User,
    /// An organization (tenant).
    Organization,
    /// A piece of learning content.
    LearningItem,
    /// A learning session.
    Session,
    /// A learner's progress record.
    Progress,
    /// A content category.
    Category,
}

impl ResourceKind {
    /// Returns the wire name of this resource kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
            Self::LearningItem => "learning_item",
            Self::Session => "session",
            Self::Progress => "progress",
            Self::Category => "category",
        }
    }

    /// Returns all resource kinds.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::User,
            Self::Organization,
            Self::LearningItem,
            Self::Session,
            Self::Progress,
            Self::Category,
        ]
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "organization" => Ok(Self::Organization),
            "learning_item" => Ok(Self::LearningItem),
            "session" => Ok(Self::Session),
            "progress" => Ok(Self::Progress),
            "category" => Ok(Self::Category),
            other => Err(GateError::validation_field(
                format!("unknown resource kind '{other}'"),
                "resource",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trips_through_str() {
        for action in PermissionAction::all() {
            assert_eq!(action.as_str().parse::<PermissionAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_resource_round_trips_through_str() {
        for resource in ResourceKind::all() {
            assert_eq!(resource.as_str().parse::<ResourceKind>().unwrap(), resource);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("READ".parse::<PermissionAction>().unwrap(), PermissionAction::Read);
        assert_eq!("User".parse::<ResourceKind>().unwrap(), ResourceKind::User);
    }

    #[test]
    fn test_unknown_names_are_validation_errors() {
        let err = "annihilate".parse::<PermissionAction>().unwrap_err();
        assert_eq!(err.category(), cerberus_core::ErrorCategory::ValidationError);
    }

    #[test]
    fn test_serde_names_match_wire_names() {
        let json = serde_json::to_string(&ResourceKind::LearningItem).unwrap();
        assert_eq!(json, "\"learning_item\"");
    }
}
