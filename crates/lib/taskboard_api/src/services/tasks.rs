//! Task service. Tasks carry no access data of their own; every decision is
//! made against the parent project.

use taskboard_core::models::auth::User;
use taskboard_core::models::project::{Task, TaskUpdate};
use taskboard_core::policy::{TaskAction, authorize_task};
use taskboard_core::store::Store;
use taskboard_core::validation::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN, Validator};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::models::UpdateTaskRequest;

/// Load a task, then its parent project, and decide `action` for `user`.
pub async fn task_for(
    store: &dyn Store,
    task_id: Uuid,
    user: &User,
    action: TaskAction,
) -> AppResult<Task> {
    let task = store.find_task(task_id).await?.ok_or(AppError::NotFound)?;

    let Some(parent) = store.find_project(task.project).await? else {
        warn!(%task_id, project_id = %task.project, "task without parent project");
        return Err(AppError::NotFound);
    };

    if let Err(denied) = authorize_task(&parent, user.id, action) {
        debug!(%task_id, user_id = %user.id, ?action, "task access denied");
        return Err(denied.into());
    }
    Ok(task)
}

/// Tasks assigned to the caller; `open_only` hides finished ones.
pub async fn list_tasks(store: &dyn Store, user: &User, open_only: bool) -> AppResult<Vec<Task>> {
    Ok(store.list_tasks_for_assignee(user.id, open_only).await?)
}

pub async fn get_task(store: &dyn Store, user: &User, task_id: Uuid) -> AppResult<Task> {
    task_for(store, task_id, user, TaskAction::View).await
}

/// Edit a task. Marking it done stamps the completion date.
pub async fn update_task(
    store: &dyn Store,
    user: &User,
    task_id: Uuid,
    body: JsonBody,
) -> AppResult<Task> {
    let current = task_for(store, task_id, user, TaskAction::Update).await?;
    let req: UpdateTaskRequest = body.parse()?;

    let name = req.name.as_deref().map(str::trim);
    let description = req.description.as_deref().map(str::trim);

    let mut v = Validator::new();
    if let Some(name) = name {
        v.length("name", "task name", name, 1, NAME_MAX_LEN);
    }
    if let Some(description) = description {
        v.length(
            "description",
            "description",
            description,
            0,
            DESCRIPTION_MAX_LEN,
        );
    }
    v.finish()?;

    let update = TaskUpdate {
        name: name.map(str::to_string),
        description: description.map(str::to_string),
        due_date: req.due_date,
        done: req.done,
    };
    let became_done = update.done == Some(true) && !current.done;

    let task = store
        .update_task(task_id, update)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(%task_id, done = task.done, became_done, "task updated");
    Ok(task)
}

pub async fn delete_task(store: &dyn Store, user: &User, task_id: Uuid) -> AppResult<()> {
    task_for(store, task_id, user, TaskAction::Delete).await?;

    if !store.delete_task(task_id).await? {
        return Err(AppError::NotFound);
    }
    info!(%task_id, "task deleted");
    Ok(())
}
