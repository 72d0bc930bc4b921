//! Project service — listing, lifecycle and membership of projects.
//!
//! Every operation on an existing project goes through [`project_for`]:
//! lookup first (404), then the policy decision (403). Request bodies are
//! parsed only after that, so their errors never reach an outsider.

use std::collections::BTreeSet;

use taskboard_core::models::auth::{User, UserSummary};
use taskboard_core::models::project::{
    NewProject, NewTask, Project, ProjectStatus, ProjectUpdate, Task, TaskType,
};
use taskboard_core::policy::{ProjectAction, authorize_project};
use taskboard_core::store::Store;
use taskboard_core::validation::{DESCRIPTION_MAX_LEN, FieldError, NAME_MAX_LEN, Validator};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::{
    CreateProjectRequest, CreateTaskRequest, InviteRequest, LeaveResponse, ParticipantsResponse,
    ProjectAssignees, ProjectDetail, UpdateProjectRequest,
};

/// Load a project and decide `action` for `user` on it.
pub async fn project_for(
    store: &dyn Store,
    project_id: Uuid,
    user: &User,
    action: ProjectAction,
) -> AppResult<Project> {
    let project = store
        .find_project(project_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(denied) = authorize_project(&project, user.id, action) {
        debug!(%project_id, user_id = %user.id, ?action, "project access denied");
        return Err(denied.into());
    }
    Ok(project)
}

/// Ensure every id names an existing user.
async fn ensure_users_exist(store: &dyn Store, field: &str, ids: &BTreeSet<Uuid>) -> AppResult<()> {
    let ids: Vec<Uuid> = ids.iter().copied().collect();
    let found = store.find_user_summaries(&ids).await?;
    if found.len() == ids.len() {
        return Ok(());
    }
    Err(AppError::Validation(vec![FieldError {
        field: field.to_string(),
        msg: "unknown user".into(),
    }]))
}

fn members_of(project: &Project) -> Vec<Uuid> {
    project.members().collect()
}

// ---------------------------------------------------------------------------
// Collection operations
// ---------------------------------------------------------------------------

/// Projects the caller belongs to. `in_progress_only` keeps the default
/// listing to active projects.
pub async fn list_projects(
    store: &dyn Store,
    user: &User,
    in_progress_only: bool,
) -> AppResult<Vec<Project>> {
    let status = in_progress_only.then_some(ProjectStatus::InProgress);
    Ok(store.list_projects_for(user.id, status).await?)
}

/// In-progress projects with their members, for picking task assignees.
pub async fn list_assignees(store: &dyn Store, user: &User) -> AppResult<Vec<ProjectAssignees>> {
    let projects = store
        .list_projects_for(user.id, Some(ProjectStatus::InProgress))
        .await?;

    let mut out = Vec::with_capacity(projects.len());
    for project in projects {
        let members = store.find_user_summaries(&members_of(&project)).await?;
        out.push(ProjectAssignees {
            id: project.id,
            name: project.name,
            members,
        });
    }
    Ok(out)
}

/// Create a project authored by the caller.
pub async fn create_project(
    store: &dyn Store,
    user: &User,
    req: CreateProjectRequest,
) -> AppResult<Project> {
    let name = req.name.trim();

    let mut v = Validator::new();
    v.length("name", "project name", name, 1, NAME_MAX_LEN);
    let ids = v.ids("participants", &req.participants);
    v.finish()?;

    let participants: BTreeSet<Uuid> = ids.into_iter().filter(|id| *id != user.id).collect();
    ensure_users_exist(store, "participants", &participants).await?;

    let project = store
        .create_project(NewProject {
            name: name.to_string(),
            author: user.id,
            participants,
            link: req.link.filter(|l| !l.trim().is_empty()),
            deadline: req.deadline,
        })
        .await?;
    info!(project_id = %project.id, author = %user.id, "project created");
    Ok(project)
}

// ---------------------------------------------------------------------------
// Single-project operations
// ---------------------------------------------------------------------------

/// A project with its member summaries and tasks.
pub async fn project_detail(
    store: &dyn Store,
    user: &User,
    project_id: Uuid,
) -> AppResult<ProjectDetail> {
    let project = project_for(store, project_id, user, ProjectAction::View).await?;
    let members = store.find_user_summaries(&members_of(&project)).await?;
    let tasks = store.list_tasks_for_project(project.id).await?;
    Ok(ProjectDetail {
        project,
        members,
        tasks,
    })
}

/// Users not yet in the project.
pub async fn users_to_invite(
    store: &dyn Store,
    user: &User,
    project_id: Uuid,
) -> AppResult<Vec<UserSummary>> {
    let project = project_for(store, project_id, user, ProjectAction::ListInvitable).await?;
    Ok(store.list_users_except(&members_of(&project)).await?)
}

/// Add participants. Re-inviting a member changes nothing.
pub async fn invite(
    store: &dyn Store,
    user: &User,
    project_id: Uuid,
    body: JsonBody,
) -> AppResult<ParticipantsResponse> {
    let project = project_for(store, project_id, user, ProjectAction::Invite).await?;
    let req: InviteRequest = body.parse()?;

    if req.participants.is_empty() {
        return Err(AppError::BadRequest("No participants to invite".into()));
    }
    let mut v = Validator::new();
    let ids = v.ids("participants", &req.participants);
    v.finish()?;

    let invited: BTreeSet<Uuid> = ids.into_iter().filter(|id| *id != project.author).collect();
    ensure_users_exist(store, "participants", &invited).await?;

    let invited: Vec<Uuid> = invited.into_iter().collect();
    let project = store
        .add_participants(project.id, &invited)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(%project_id, count = invited.len(), "participants invited");

    Ok(ParticipantsResponse {
        participants: project.participants.into_iter().collect(),
    })
}

/// Owner edit of name, status, link and deadline.
pub async fn update_project(
    store: &dyn Store,
    user: &User,
    project_id: Uuid,
    body: JsonBody,
) -> AppResult<Project> {
    project_for(store, project_id, user, ProjectAction::Update).await?;
    let req: UpdateProjectRequest = body.parse()?;

    let name = req.name.trim();
    let mut v = Validator::new();
    v.length("name", "project name", name, 1, NAME_MAX_LEN);
    let status = match req.status.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<ProjectStatus>() {
            Ok(status) => Some(status),
            Err(msg) => {
                v.check("status", false, msg);
                None
            }
        },
    };
    v.finish()?;

    let project = store
        .update_project(
            project_id,
            ProjectUpdate {
                name: name.to_string(),
                status,
                link: req.link.filter(|l| !l.trim().is_empty()),
                deadline: req.deadline,
            },
        )
        .await?
        .ok_or(AppError::NotFound)?;
    info!(%project_id, status = %project.status, "project updated");
    Ok(project)
}

/// Remove the caller from the participants.
pub async fn leave(store: &dyn Store, user: &User, project_id: Uuid) -> AppResult<LeaveResponse> {
    project_for(store, project_id, user, ProjectAction::Leave).await?;

    let project = store
        .remove_participant(project_id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(%project_id, user_id = %user.id, "participant left project");
    Ok(LeaveResponse { project })
}

/// Delete a project and its tasks.
pub async fn delete_project(store: &dyn Store, user: &User, project_id: Uuid) -> AppResult<()> {
    project_for(store, project_id, user, ProjectAction::Delete).await?;

    if !store.delete_project(project_id).await? {
        return Err(AppError::NotFound);
    }
    info!(%project_id, "project deleted");
    Ok(())
}

/// Create a task in the project. The assignee defaults to the caller and
/// must be a project member.
pub async fn create_task(
    store: &dyn Store,
    user: &User,
    project_id: Uuid,
    body: JsonBody,
) -> AppResult<Task> {
    let project = project_for(store, project_id, user, ProjectAction::CreateTask).await?;
    let req: CreateTaskRequest = body.parse()?;

    let name = req.name.trim();
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let mut v = Validator::new();
    v.length("name", "task name", name, 1, NAME_MAX_LEN);
    if let Some(description) = description {
        v.length(
            "description",
            "description",
            description,
            0,
            DESCRIPTION_MAX_LEN,
        );
    }
    let task_type = match req.task_type.as_deref() {
        None | Some("") => TaskType::default(),
        Some(raw) => raw.parse::<TaskType>().unwrap_or_else(|msg: String| {
            v.check("taskType", false, msg);
            TaskType::default()
        }),
    };
    let assignee = match req.assignee.as_deref().map(str::trim) {
        None | Some("") => user.id,
        Some(raw) => {
            let ids = v.ids("assignee", &[raw.to_string()]);
            let id = ids.first().copied().unwrap_or(user.id);
            v.check(
                "assignee",
                ids.is_empty() || project.members().any(|m| m == id),
                "assignee must be a project member",
            );
            id
        }
    };
    v.finish()?;

    let task = store
        .create_task(NewTask {
            name: name.to_string(),
            description: description.map(str::to_string),
            task_type,
            project: project.id,
            assignee,
            due_date: req.due_date,
        })
        .await?;
    info!(task_id = %task.id, %project_id, "task created");
    Ok(task)
}
