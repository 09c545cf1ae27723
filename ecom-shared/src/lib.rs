//! # Ecom Shared Library
//!
//! This crate contains the domain types and business logic used by the
//! e-commerce API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, bearer tokens and the authorization guard
//! - `store`: Collaborator traits with PostgreSQL and in-memory implementations
//! - `checkout`: The order placement workflow
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod checkout;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
