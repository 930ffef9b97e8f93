//! Domain layer for the FlagHub backend.
//!
//! This crate contains:
//! - Domain models (User, Organization, FeatureFlag)
//! - The organization permission check
//! - The revision approval state machine

pub mod models;
