//! In-process store, used by tests and `--in-memory` development runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EMAIL_TAKEN, IdentityStore, NICKNAME_TAKEN, ResourceStore, StoreError};
use crate::models::auth::{User, UserSummary, UserWithPassword};
use crate::models::project::{
    NewProject, NewTask, Project, ProjectStatus, ProjectUpdate, Task, TaskUpdate,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserWithPassword>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
}

/// Cloneable handle to one shared set of in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_due_date(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.created_at.cmp(&b.created_at),
    });
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|u| u.user.clone()))
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.user.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.user.email == email))
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.user.nickname == nickname))
    }

    async fn create_user(
        &self,
        email: &str,
        nickname: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.user.email == email) {
            return Err(StoreError::Conflict(EMAIL_TAKEN.into()));
        }
        if tables.users.values().any(|u| u.user.nickname == nickname) {
            return Err(StoreError::Conflict(NICKNAME_TAKEN.into()));
        }
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            nickname: nickname.to_string(),
        };
        tables.users.insert(
            user.id,
            UserWithPassword {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn update_nickname(&self, id: Uuid, nickname: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.user.nickname == nickname && u.user.id != id)
        {
            return Err(StoreError::Conflict(NICKNAME_TAKEN.into()));
        }
        if let Some(u) = tables.users.get_mut(&id) {
            u.user.nickname = nickname.to_string();
        }
        Ok(())
    }

    async fn list_users_except(&self, exclude: &[Uuid]) -> Result<Vec<UserSummary>, StoreError> {
        let tables = self.tables.read().await;
        let mut users: Vec<UserSummary> = tables
            .users
            .values()
            .filter(|u| !exclude.contains(&u.user.id))
            .map(|u| UserSummary::from(&u.user))
            .collect();
        users.sort_by(|a, b| a.nickname.cmp(&b.nickname));
        Ok(users)
    }

    async fn find_user_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .map(|u| UserSummary::from(&u.user))
            .collect())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::now_v7(),
            name: project.name,
            author: project.author,
            participants: project.participants,
            status: ProjectStatus::InProgress,
            link: project.link,
            deadline: project.deadline,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn list_projects_for(
        &self,
        user_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.author == user_id || p.participants.contains(&user_id))
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn update_project(
        &self,
        id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&id).map(|p| {
            p.name = update.name;
            p.link = update.link;
            p.deadline = update.deadline;
            if let Some(status) = update.status {
                p.status = status;
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn add_participants(
        &self,
        id: Uuid,
        users: &[Uuid],
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&id).map(|p| {
            p.participants.extend(users.iter().copied());
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn remove_participant(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&id).map(|p| {
            p.participants.remove(&user_id);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let existed = tables.projects.remove(&id).is_some();
        tables.tasks.retain(|_, t| t.project != id);
        Ok(existed)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::now_v7(),
            name: task.name,
            description: task.description,
            task_type: task.task_type,
            project: task.project,
            assignee: task.assignee,
            done: false,
            due_date: task.due_date,
            completed_date: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.project == project_id)
            .cloned()
            .collect();
        by_due_date(&mut tasks);
        Ok(tasks)
    }

    async fn list_tasks_for_assignee(
        &self,
        user_id: Uuid,
        open_only: bool,
    ) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.assignee == user_id && !(open_only && t.done))
            .cloned()
            .collect();
        by_due_date(&mut tasks);
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables.tasks.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        task.completed_date = update.completed_date_for(task, now);
        if let Some(name) = update.name {
            task.name = name;
        }
        if update.description.is_some() {
            task.description = update.description;
        }
        if update.due_date.is_some() {
            task.due_date = update.due_date;
        }
        if let Some(done) = update.done {
            task.done = done;
        }
        task.updated_at = now;
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}
