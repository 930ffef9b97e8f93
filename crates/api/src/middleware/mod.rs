//! Middleware and logging setup.

pub mod logging;
