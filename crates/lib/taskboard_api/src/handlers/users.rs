//! User request handlers.

use axum::Json;
use axum::extract::{Extension, State};
use axum_extra::extract::WithRejection;
use taskboard_core::models::auth::UserSummary;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{MessageResponse, UpdateNicknameRequest};
use crate::services::auth::AuthenticatedUser;
use crate::services::users;

/// `GET /users` — everyone except the caller.
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(
        users::list_other_users(state.store.as_ref(), &user).await?,
    ))
}

/// `POST /users/update-nickname`
pub async fn update_nickname_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateNicknameRequest>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(
        users::update_nickname(state.store.as_ref(), &user, &body).await?,
    ))
}
