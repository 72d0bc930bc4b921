//! Persistence seams for identities and project/task resources.
//!
//! The auth core only depends on these traits. [`memory::MemoryStore`] backs
//! tests and local development; [`postgres::PgStore`] backs production.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{User, UserSummary, UserWithPassword};
use crate::models::project::{NewProject, NewTask, Project, ProjectStatus, ProjectUpdate, Task, TaskUpdate};

/// Conflict message for a registered email. It never repeats the value.
pub const EMAIL_TAKEN: &str = "The email is already in use. Please log in.";

/// Conflict message for a taken nickname.
pub const NICKNAME_TAKEN: &str = "The nickname is already taken.";

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field (email, nickname) is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Identity lookups and the few identity writes the service performs.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<UserWithPassword>, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    async fn nickname_exists(&self, nickname: &str) -> Result<bool, StoreError>;

    /// Create a user. Fails with [`StoreError::Conflict`] on a duplicate
    /// email or nickname.
    async fn create_user(
        &self,
        email: &str,
        nickname: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    async fn update_nickname(&self, id: Uuid, nickname: &str) -> Result<(), StoreError>;

    /// Every user whose id is not in `exclude`, ordered by nickname.
    async fn list_users_except(&self, exclude: &[Uuid]) -> Result<Vec<UserSummary>, StoreError>;

    /// Summaries for the given ids; unknown ids are skipped.
    async fn find_user_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, StoreError>;
}

/// Project and task persistence.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    /// Projects the user authored or participates in, newest first,
    /// optionally restricted to one status.
    async fn list_projects_for(
        &self,
        user_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, StoreError>;

    async fn update_project(
        &self,
        id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError>;

    /// Set-union `users` into the participants. Repeated ids collapse.
    async fn add_participants(
        &self,
        id: Uuid,
        users: &[Uuid],
    ) -> Result<Option<Project>, StoreError>;

    async fn remove_participant(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError>;

    /// Delete a project and all of its tasks. Returns whether it existed.
    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Tasks of a project ordered by due date (undated last).
    async fn list_tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>, StoreError>;

    /// Tasks assigned to a user; `open_only` drops finished ones.
    async fn list_tasks_for_assignee(
        &self,
        user_id: Uuid,
        open_only: bool,
    ) -> Result<Vec<Task>, StoreError>;

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Both stores behind one object, as held by the HTTP layer.
pub trait Store: IdentityStore + ResourceStore {}

impl<T: IdentityStore + ResourceStore> Store for T {}
