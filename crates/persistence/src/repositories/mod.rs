//! Repository implementations.

pub mod feature_flag;
pub mod organization;
pub mod user;

pub use feature_flag::FeatureFlagRepository;
pub use organization::OrganizationRepository;
pub use user::UserRepository;
