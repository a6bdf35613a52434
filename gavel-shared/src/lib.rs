//! # Gavel Shared Library
//!
//! This crate contains the data model, auction rules and authentication
//! primitives used by the Gavel API server.
//!
//! ## Module Organization
//!
//! - `auction`: Listing state machine, bid rules and form action resolution
//! - `auth`: Password hashing, session tokens and the request-scoped auth context
//! - `db`: Connection pool, migrations and the referential-integrity policy table
//! - `models`: Database models and their queries
//! - `validation`: Field validation and the image URL validator

pub mod auction;
pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the Gavel shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
