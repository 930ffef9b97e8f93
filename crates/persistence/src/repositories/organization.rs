//! Organization repository for database operations.

use domain::models::Organization;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{OrganizationEntity, OrganizationMemberEntity};

/// Repository for organization database operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load an organization together with its membership roles.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, sqlx::Error> {
        let entity = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(entity) = entity else {
            return Ok(None);
        };

        let members = sqlx::query_as::<_, OrganizationMemberEntity>(
            r#"
            SELECT user_id, role
            FROM organization_members
            WHERE organization_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(entity.into_domain(members)))
    }
}
