//! Authentication service — signup/login/refresh flows delegating to
//! `taskboard_core::auth`.

use taskboard_core::auth::jwt::{RefreshTokenParts, TokenCodec, TokenSubject, TokenVerifier};
use taskboard_core::auth::password::{check_credentials, hash_password};
use taskboard_core::models::auth::User;
use taskboard_core::store::{EMAIL_TAKEN, NICKNAME_TAKEN, Store};
use taskboard_core::validation::Validator;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RefreshResponse, SignupRequest};

/// The caller, as resolved by one of the auth guards.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// ---------------------------------------------------------------------------
// Identity resolution
// ---------------------------------------------------------------------------

/// Verify `token` with `verifier` and load the user it names.
///
/// A bad token and a token for a user that no longer exists both come back
/// as [`AppError::Unauthorized`].
pub async fn resolve_identity<V: TokenVerifier>(
    verifier: &V,
    token: &str,
    store: &dyn Store,
) -> AppResult<User> {
    let claims = verifier.verify(token).map_err(|e| {
        debug!(error = %e, "token rejected");
        AppError::Unauthorized
    })?;

    let user_id = claims.user_id();
    match store.find_user_by_id(user_id).await? {
        Some(user) => Ok(user),
        None => {
            debug!(%user_id, "token names an unknown user");
            Err(AppError::Unauthorized)
        }
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// Issue an access token plus a split refresh token for `user`.
fn issue_session(codec: &TokenCodec, user: &User) -> AppResult<(AuthResponse, RefreshTokenParts)> {
    let token = codec.issue_access_token(user)?;
    let refresh = codec.issue_refresh_token(user)?;
    Ok((
        AuthResponse {
            token,
            nickname: user.nickname.clone(),
            id: user.id,
        },
        refresh,
    ))
}

/// Register a new user and start a session.
pub async fn signup(
    store: &dyn Store,
    codec: &TokenCodec,
    req: &SignupRequest,
) -> AppResult<(AuthResponse, RefreshTokenParts)> {
    let email = req.email.trim();
    let nickname = req.nickname.trim();
    let password = req.password.trim();

    let mut v = Validator::new();
    v.email("email", email)
        .nickname("nickname", nickname)
        .password("password", &req.password)
        .check(
            "confirmPassword",
            req.confirm_password.trim() == password,
            "passwords must match",
        );
    v.finish()?;

    if store.email_exists(email).await? {
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }
    if store.nickname_exists(nickname).await? {
        return Err(AppError::Conflict(NICKNAME_TAKEN.into()));
    }

    let hash = hash_password(password)?;
    let user = store.create_user(email, nickname, &hash).await?;
    info!(user_id = %user.id, "user signed up");

    issue_session(codec, &user)
}

/// Authenticate with email and password.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    store: &dyn Store,
    codec: &TokenCodec,
    req: &LoginRequest,
) -> AppResult<(AuthResponse, RefreshTokenParts)> {
    let email = req.email.trim();

    let mut v = Validator::new();
    v.email("email", email).password("password", &req.password);
    v.finish()?;

    let Some(found) = store.find_user_by_email(email).await? else {
        debug!("login for unknown email");
        return Err(AppError::Unauthorized);
    };
    check_credentials(req.password.trim(), &found.password_hash)?;

    info!(user_id = %found.user.id, "user logged in");
    issue_session(codec, &found.user)
}

/// Mint a new access token for a user already resolved by the refresh guard.
pub fn refresh(codec: &TokenCodec, user: &User) -> AppResult<RefreshResponse> {
    let token = codec.issue_access_token(user)?;
    debug!(user_id = %user.id, "access token refreshed");
    Ok(RefreshResponse { token })
}
