//! API server configuration.

use taskboard_core::auth::jwt::TokenSecrets;
use thiserror::Error;

/// Default allowed browser origin.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Fatal configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Access and refresh token signing secrets.
    pub secrets: TokenSecrets,
    /// Browser origin allowed to send credentialed requests.
    pub cors_origin: String,
    /// Mark refresh cookies `Secure`. Only disable for plain-HTTP local testing.
    pub cookie_secure: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable               | Default                             |
    /// |------------------------|-------------------------------------|
    /// | `BIND_ADDR`            | `127.0.0.1:3100`                    |
    /// | `DATABASE_URL`         | `postgres://localhost:5432/taskboard` |
    /// | `ACCESS_TOKEN_SECRET`  | required                            |
    /// | `REFRESH_TOKEN_SECRET` | required                            |
    /// | `CORS_ORIGIN`          | `http://localhost:3000`             |
    /// | `COOKIE_SECURE`        | `true`                              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/taskboard".into()),
            secrets: secrets_from_env()?,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.into()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        })
    }
}

/// Read `ACCESS_TOKEN_SECRET` and `REFRESH_TOKEN_SECRET`; both are required.
pub fn secrets_from_env() -> Result<TokenSecrets, ConfigError> {
    Ok(TokenSecrets {
        access: required("ACCESS_TOKEN_SECRET")?,
        refresh: required("REFRESH_TOKEN_SECRET")?,
    })
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
