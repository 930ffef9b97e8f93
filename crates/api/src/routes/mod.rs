//! API route handlers.

pub mod auth;
pub mod feature_flags;
pub mod health;
