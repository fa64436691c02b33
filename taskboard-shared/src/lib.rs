//! # Taskboard Shared Library
//!
//! This crate contains the data model, store operations and authentication
//! primitives used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, cards, comments, their stores and public views
//! - `auth`: Password hashing, bearer tokens, auth context and ownership checks
//! - `constraints`: Write-time rules spanning more than one row
//! - `db`: Connection pool, migrations and seed data

pub mod auth;
pub mod constraints;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
