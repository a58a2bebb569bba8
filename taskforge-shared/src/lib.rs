//! # TaskForge Shared Library
//!
//! This crate contains the domain layer shared by the TaskForge API server:
//! database models with their repository operations, the authorization
//! policy, and authentication primitives.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: JWT tokens, password hashing, and the authorization policy
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskForge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
