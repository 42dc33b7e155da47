//! # Workboard Shared Library
//!
//! This crate contains the domain types shared by the Workboard client
//! library and its terminal front end.
//!
//! ## Module Organization
//!
//! - `models`: Users, boards, tasks and the request/response payloads of the REST API
//! - `auth`: Session tokens and ownership-based permission checks
//! - `validation`: Field-level error collection for client and backend validation

pub mod auth;
pub mod models;
pub mod validation;

/// Current version of the Workboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
