//! Shared utilities for the FlagHub backend.
//!
//! This crate provides common functionality used across the other crates:
//! - JWT issuing and verification
//! - Password hashing with Argon2id
//! - Pagination parameter handling

pub mod jwt;
pub mod pagination;
pub mod password;
