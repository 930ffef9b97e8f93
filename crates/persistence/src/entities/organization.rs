//! Organization entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for org_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "snake_case")]
pub enum RoleDb {
    ReadOnly,
    Collaborator,
}

impl From<RoleDb> for domain::models::Role {
    fn from(db: RoleDb) -> Self {
        match db {
            RoleDb::ReadOnly => Self::ReadOnly,
            RoleDb::Collaborator => Self::Collaborator,
        }
    }
}

impl From<domain::models::Role> for RoleDb {
    fn from(role: domain::models::Role) -> Self {
        match role {
            domain::models::Role::ReadOnly => Self::ReadOnly,
            domain::models::Role::Collaborator => Self::Collaborator,
        }
    }
}

/// Database row mapping for the organizations table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationEntity {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row mapping for the organization_members table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationMemberEntity {
    pub user_id: Uuid,
    pub role: RoleDb,
}

impl OrganizationEntity {
    /// Assembles the domain model from the organization row and its
    /// membership rows.
    pub fn into_domain(
        self,
        members: Vec<OrganizationMemberEntity>,
    ) -> domain::models::Organization {
        domain::models::Organization {
            id: self.id,
            name: self.name,
            members: members
                .into_iter()
                .map(|m| domain::models::OrganizationMember {
                    user_id: m.user_id,
                    role: m.role.into(),
                })
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(
            domain::models::Role::from(RoleDb::Collaborator),
            domain::models::Role::Collaborator
        );
        assert_eq!(RoleDb::from(domain::models::Role::ReadOnly), RoleDb::ReadOnly);
    }

    #[test]
    fn test_into_domain_carries_members() {
        let entity = OrganizationEntity {
            id: Uuid::new_v4(),
            name: "acme".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let member_id = Uuid::new_v4();
        let org = entity.into_domain(vec![OrganizationMemberEntity {
            user_id: member_id,
            role: RoleDb::ReadOnly,
        }]);

        assert_eq!(org.members.len(), 1);
        assert_eq!(org.member_role(member_id), Some(domain::models::Role::ReadOnly));
    }
}
