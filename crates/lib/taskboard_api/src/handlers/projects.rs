//! Project request handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum_extra::extract::WithRejection;
use taskboard_core::models::auth::UserSummary;
use taskboard_core::models::project::{Project, Task};
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{
    CreateProjectRequest, LeaveResponse, MessageResponse, ParticipantsResponse,
    ProjectAssignees, ProjectDetail,
};
use crate::services::auth::AuthenticatedUser;
use crate::services::projects;

/// `GET /projects` — the caller's in-progress projects.
pub async fn list_in_progress_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(
        projects::list_projects(state.store.as_ref(), &user, true).await?,
    ))
}

/// `GET /projects/all` — every project the caller belongs to.
pub async fn list_all_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(
        projects::list_projects(state.store.as_ref(), &user, false).await?,
    ))
}

/// `GET /projects/assignees`
pub async fn assignees_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<ProjectAssignees>>> {
    Ok(Json(
        projects::list_assignees(state.store.as_ref(), &user).await?,
    ))
}

/// `POST /projects/create`
pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    WithRejection(Json(body), _): WithRejection<Json<CreateProjectRequest>, AppError>,
) -> AppResult<Json<Project>> {
    Ok(Json(
        projects::create_project(state.store.as_ref(), &user, body).await?,
    ))
}

/// `GET /projects/{project_id}`
pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<ProjectDetail>> {
    Ok(Json(
        projects::project_detail(state.store.as_ref(), &user, project_id).await?,
    ))
}

/// `GET /projects/{project_id}/users-to-invite`
pub async fn users_to_invite_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(
        projects::users_to_invite(state.store.as_ref(), &user, project_id).await?,
    ))
}

/// `POST /projects/{project_id}/invite`
pub async fn invite_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    body: JsonBody,
) -> AppResult<Json<ParticipantsResponse>> {
    Ok(Json(
        projects::invite(state.store.as_ref(), &user, project_id, body).await?,
    ))
}

/// `POST /projects/{project_id}/update`
pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    body: JsonBody,
) -> AppResult<Json<Project>> {
    Ok(Json(
        projects::update_project(state.store.as_ref(), &user, project_id, body).await?,
    ))
}

/// `POST /projects/{project_id}/leave`
pub async fn leave_project_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<LeaveResponse>> {
    Ok(Json(
        projects::leave(state.store.as_ref(), &user, project_id).await?,
    ))
}

/// `POST /projects/{project_id}/delete`
pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    projects::delete_project(state.store.as_ref(), &user, project_id).await?;
    Ok(Json(MessageResponse {
        message: "Project deleted".into(),
    }))
}

/// `POST /projects/{project_id}/create-task`
pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(project_id): Path<Uuid>,
    body: JsonBody,
) -> AppResult<Json<Task>> {
    Ok(Json(
        projects::create_task(state.store.as_ref(), &user, project_id, body).await?,
    ))
}
