//! Organization domain model and membership permission check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Membership privilege levels within an organization.
///
/// `Collaborator` implies `ReadOnly` privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ReadOnly,
    Collaborator,
}

impl Role {
    /// Check if this role is at least as privileged as `required`.
    pub fn has_at_least(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Collaborator, _) => true,
            (Role::ReadOnly, Role::ReadOnly) => true,
            (Role::ReadOnly, Role::Collaborator) => false,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read_only" => Ok(Role::ReadOnly),
            "collaborator" => Ok(Role::Collaborator),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::ReadOnly => write!(f, "read_only"),
            Role::Collaborator => write!(f, "collaborator"),
        }
    }
}

/// A single membership entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrganizationMember {
    pub user_id: Uuid,
    pub role: Role,
}

/// A tenant grouping that owns feature flags and membership data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<OrganizationMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Look up a user's membership role, if any.
    pub fn member_role(&self, user_id: Uuid) -> Option<Role> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }
}

/// Whether `user_id` holds at least `required` within `organization`.
///
/// Non-members simply fail the check; this is never an error.
pub fn user_has_permission(user_id: Uuid, organization: &Organization, required: Role) -> bool {
    organization
        .member_role(user_id)
        .map(|role| role.has_at_least(required))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org_with(members: Vec<OrganizationMember>) -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "acme".to_string(),
            members,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_has_at_least() {
        assert!(Role::Collaborator.has_at_least(Role::Collaborator));
        assert!(Role::Collaborator.has_at_least(Role::ReadOnly));
        assert!(Role::ReadOnly.has_at_least(Role::ReadOnly));
        assert!(!Role::ReadOnly.has_at_least(Role::Collaborator));
    }

    #[test]
    fn test_collaborator_passes_both_checks() {
        let user_id = Uuid::new_v4();
        let org = org_with(vec![OrganizationMember {
            user_id,
            role: Role::Collaborator,
        }]);

        assert!(user_has_permission(user_id, &org, Role::ReadOnly));
        assert!(user_has_permission(user_id, &org, Role::Collaborator));
    }

    #[test]
    fn test_read_only_passes_only_read_only() {
        let user_id = Uuid::new_v4();
        let org = org_with(vec![OrganizationMember {
            user_id,
            role: Role::ReadOnly,
        }]);

        assert!(user_has_permission(user_id, &org, Role::ReadOnly));
        assert!(!user_has_permission(user_id, &org, Role::Collaborator));
    }

    #[test]
    fn test_non_member_fails_both() {
        let org = org_with(vec![OrganizationMember {
            user_id: Uuid::new_v4(),
            role: Role::Collaborator,
        }]);
        let outsider = Uuid::new_v4();

        assert!(!user_has_permission(outsider, &org, Role::ReadOnly));
        assert!(!user_has_permission(outsider, &org, Role::Collaborator));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("read_only").unwrap(), Role::ReadOnly);
        assert_eq!(Role::from_str("COLLABORATOR").unwrap(), Role::Collaborator);
        assert!(Role::from_str("owner").is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&Role::ReadOnly).unwrap(),
            "\"read_only\""
        );
        let role: Role = serde_json::from_str("\"collaborator\"").unwrap();
        assert_eq!(role, Role::Collaborator);
    }
}
