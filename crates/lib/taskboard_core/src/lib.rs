//! # taskboard_core
//!
//! Core domain logic for Taskboard: token issuance and verification,
//! credential checks, the project/task authorization policy, field
//! validation, and the persistence seams.

pub mod auth;
pub mod models;
pub mod policy;
pub mod store;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
