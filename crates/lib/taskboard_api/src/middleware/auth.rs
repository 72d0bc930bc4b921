//! Authentication middleware.
//!
//! `require_auth` guards every project/task/user route with the bearer access
//! token; `require_refresh` guards token renewal with the split refresh
//! cookies. Both resolve the token's user against the identity store and
//! inject [`AuthenticatedUser`] into request extensions. Every failure is a
//! bare 401.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;
use taskboard_core::auth::jwt::reconstruct_refresh_token;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::services::auth::resolve_identity;
use crate::services::cookies::read_refresh_cookies;

pub use crate::services::auth::AuthenticatedUser;

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the
/// access token, and injects the resolved user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&request).map(str::to_owned) else {
        debug!("access guard: missing or malformed authorization header");
        return Err(AppError::Unauthorized);
    };

    let user = resolve_identity(state.codec.access(), &token, state.store.as_ref()).await?;
    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

/// Axum middleware: rebuilds the refresh token from its two cookies,
/// verifies it, and injects the resolved user.
pub async fn require_refresh(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let (header_payload, signature) = read_refresh_cookies(&jar);
    if header_payload.is_empty() || signature.is_empty() {
        debug!("refresh guard: refresh cookie missing");
        return Err(AppError::Unauthorized);
    }

    let token = reconstruct_refresh_token(&header_payload, &signature);
    let user = resolve_identity(state.codec.refresh(), &token, state.store.as_ref()).await?;
    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}
