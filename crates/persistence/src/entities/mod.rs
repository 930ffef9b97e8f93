//! Entity definitions (database row mappings).

pub mod feature_flag;
pub mod organization;
pub mod user;

pub use feature_flag::{FeatureFlagEntity, FlagTypeDb};
pub use organization::{OrganizationEntity, OrganizationMemberEntity, RoleDb};
pub use user::UserEntity;
