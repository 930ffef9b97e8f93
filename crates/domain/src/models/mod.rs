//! Domain models for FlagHub.

pub mod feature_flag;
pub mod organization;
pub mod user;

pub use feature_flag::{FeatureFlag, FlagType, Revision, RevisionStatus, Rule};
pub use organization::{user_has_permission, Organization, OrganizationMember, Role};
pub use user::User;
