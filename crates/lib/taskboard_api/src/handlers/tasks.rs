//! Task request handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use taskboard_core::models::project::Task;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::models::MessageResponse;
use crate::services::auth::AuthenticatedUser;
use crate::services::tasks;

/// `GET /tasks` — open tasks assigned to the caller.
pub async fn list_open_tasks_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(tasks::list_tasks(state.store.as_ref(), &user, true).await?))
}

/// `GET /tasks/all` — every task assigned to the caller.
pub async fn list_all_tasks_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(tasks::list_tasks(state.store.as_ref(), &user, false).await?))
}

/// `GET /tasks/{task_id}`
pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<Task>> {
    Ok(Json(tasks::get_task(state.store.as_ref(), &user, task_id).await?))
}

/// `POST /tasks/{task_id}/update`
pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
    body: JsonBody,
) -> AppResult<Json<Task>> {
    Ok(Json(
        tasks::update_task(state.store.as_ref(), &user, task_id, body).await?,
    ))
}

/// `POST /tasks/{task_id}/delete`
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    tasks::delete_task(state.store.as_ref(), &user, task_id).await?;
    Ok(Json(MessageResponse {
        message: "Task deleted".into(),
    }))
}
