//! Feature flag entity (database row mapping).
//!
//! Revisions live in a JSONB column on the flag row, keeping the revision
//! list composed inside its flag and making single-row updates the unit of
//! atomicity.

use chrono::{DateTime, Utc};
use domain::models::Revision;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for flag_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "flag_type", rename_all = "lowercase")]
pub enum FlagTypeDb {
    Boolean,
    Json,
    String,
    Number,
}

impl From<FlagTypeDb> for domain::models::FlagType {
    fn from(db: FlagTypeDb) -> Self {
        match db {
            FlagTypeDb::Boolean => Self::Boolean,
            FlagTypeDb::Json => Self::Json,
            FlagTypeDb::String => Self::String,
            FlagTypeDb::Number => Self::Number,
        }
    }
}

impl From<domain::models::FlagType> for FlagTypeDb {
    fn from(flag_type: domain::models::FlagType) -> Self {
        match flag_type {
            domain::models::FlagType::Boolean => Self::Boolean,
            domain::models::FlagType::Json => Self::Json,
            domain::models::FlagType::String => Self::String,
            domain::models::FlagType::Number => Self::Number,
        }
    }
}

/// Database row mapping for the feature_flags table.
#[derive(Debug, Clone, FromRow)]
pub struct FeatureFlagEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub flag_type: FlagTypeDb,
    pub version: i32,
    pub revisions: Json<Vec<Revision>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<FeatureFlagEntity> for domain::models::FeatureFlag {
    fn from(entity: FeatureFlagEntity) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            user_id: entity.user_id,
            name: entity.name,
            flag_type: entity.flag_type.into(),
            version: entity.version,
            revisions: entity.revisions.0,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_type_conversion() {
        assert_eq!(
            domain::models::FlagType::from(FlagTypeDb::Number),
            domain::models::FlagType::Number
        );
        assert_eq!(
            FlagTypeDb::from(domain::models::FlagType::Json),
            FlagTypeDb::Json
        );
    }
}
