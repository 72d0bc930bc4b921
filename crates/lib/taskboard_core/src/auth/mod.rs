//! Authentication logic.
//!
//! Provides password hashing and the access/refresh token codec shared by
//! the HTTP guards in `taskboard_api`.

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    /// Bad signature, expired, wrong key, or not a JWT at all.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing signing secret: {0}")]
    MissingSecret(&'static str),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
