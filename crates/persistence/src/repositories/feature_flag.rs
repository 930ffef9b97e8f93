//! Feature flag repository for database operations.
//!
//! Revision data rides in the flag row's JSONB column, so every write here
//! is a single statement and therefore atomic. The approval flow's
//! load-then-save sequence is the one deliberate exception; see
//! [`FeatureFlagRepository::save_revisions`].

use domain::models::{FeatureFlag, Revision};
use shared::pagination::PageParams;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{FeatureFlagEntity, FlagTypeDb};

/// Repository for feature flag database operations.
#[derive(Clone)]
pub struct FeatureFlagRepository {
    pool: PgPool,
}

impl FeatureFlagRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new flag row, revisions included.
    pub async fn insert(&self, flag: &FeatureFlag) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO feature_flags
                (id, organization_id, user_id, name, flag_type, version, revisions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(flag.id)
        .bind(flag.organization_id)
        .bind(flag.user_id)
        .bind(&flag.name)
        .bind(FlagTypeDb::from(flag.flag_type))
        .bind(flag.version)
        .bind(Json(&flag.revisions))
        .bind(flag.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load a flag by id. Soft-deleted flags are still loadable here; only
    /// listings filter them out.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FeatureFlag>, sqlx::Error> {
        let entity = sqlx::query_as::<_, FeatureFlagEntity>(
            r#"
            SELECT id, organization_id, user_id, name, flag_type, version,
                   revisions, created_at, updated_at, deleted_at
            FROM feature_flags
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List an organization's flags, newest first, excluding soft-deleted
    /// rows.
    pub async fn list_by_organization(
        &self,
        organization_id: Uuid,
        params: PageParams,
    ) -> Result<Vec<FeatureFlag>, sqlx::Error> {
        let entities = sqlx::query_as::<_, FeatureFlagEntity>(
            r#"
            SELECT id, organization_id, user_id, name, flag_type, version,
                   revisions, created_at, updated_at, deleted_at
            FROM feature_flags
            WHERE organization_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization_id)
        .bind(params.page_size)
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Append a revision to a flag's list in one atomic statement.
    ///
    /// Returns false when no row matched the flag id.
    pub async fn push_revision(
        &self,
        flag_id: Uuid,
        revision: &Revision,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE feature_flags
            SET revisions = revisions || $2::jsonb, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(flag_id)
        .bind(Json(revision))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist a rewritten revision list and version counter.
    ///
    /// Callers load the flag, run the approval pass in memory, and write
    /// the result back here. Concurrent approvals of the same flag can
    /// interleave between the load and this write; last writer wins.
    pub async fn save_revisions(
        &self,
        flag_id: Uuid,
        version: i32,
        revisions: &[Revision],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE feature_flags
            SET version = $2, revisions = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(flag_id)
        .bind(version)
        .bind(Json(revisions))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a flag by stamping deleted_at. Revisions stay in place.
    pub async fn soft_delete(&self, flag_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE feature_flags
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(flag_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
