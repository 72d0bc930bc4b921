//! Authentication request handlers.

use axum::extract::{Extension, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, MessageResponse, RefreshResponse, SignupRequest};
use crate::services::auth::{self, AuthenticatedUser};
use crate::services::cookies::{clear_refresh_cookies, set_refresh_cookies};

/// `POST /auth/signup` — create an account and start a session.
pub async fn signup_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SignupRequest>, AppError>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let (resp, refresh) = auth::signup(state.store.as_ref(), &state.codec, &body).await?;
    let jar = set_refresh_cookies(jar, refresh, state.config.cookie_secure);
    Ok((jar, Json(resp)))
}

/// `POST /auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let (resp, refresh) = auth::login(state.store.as_ref(), &state.codec, &body).await?;
    let jar = set_refresh_cookies(jar, refresh, state.config.cookie_secure);
    Ok((jar, Json(resp)))
}

/// `POST /auth/refresh` — mint a new access token from the refresh cookies.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<RefreshResponse>> {
    Ok(Json(auth::refresh(&state.codec, &user)?))
}

/// `POST /auth/logout` — expire the refresh cookies.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = clear_refresh_cookies(jar, state.config.cookie_secure);
    (
        jar,
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    )
}
