//! PostgreSQL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{EMAIL_TAKEN, IdentityStore, NICKNAME_TAKEN, ResourceStore, StoreError};
use crate::models::auth::{User, UserSummary, UserWithPassword};
use crate::models::project::{
    NewProject, NewTask, Project, ProjectStatus, ProjectUpdate, Task, TaskUpdate,
};

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.name, p.author_id, p.status, p.link, p.deadline, p.created_at, p.updated_at,
           COALESCE(array_agg(pp.user_id) FILTER (WHERE pp.user_id IS NOT NULL), '{}') AS participants
    FROM projects p
    LEFT JOIN project_participants pp ON pp.project_id = p.id
"#;

const TASK_COLUMNS: &str = "id, name, description, task_type, project_id, assignee_id, done, \
     due_date, completed_date, created_at, updated_at";

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations from `taskboard_core/migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    nickname: String,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    author_id: Uuid,
    status: String,
    link: Option<String>,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    participants: Vec<Uuid>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            author: row.author_id,
            participants: row.participants.into_iter().collect(),
            status: row.status.parse::<ProjectStatus>().map_err(StoreError::Corrupt)?,
            link: row.link,
            deadline: row.deadline,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    task_type: String,
    project_id: Uuid,
    assignee_id: Uuid,
    done: bool,
    due_date: Option<DateTime<Utc>>,
    completed_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.id,
            name: row.name,
            description: row.description,
            task_type: row.task_type.parse().map_err(StoreError::Corrupt)?,
            project: row.project_id,
            assignee: row.assignee_id,
            done: row.done,
            due_date: row.due_date,
            completed_date: row.completed_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a unique violation on `users` to [`StoreError::Conflict`], naming the
/// column by its constraint.
fn conflict_or(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            let msg = match db.constraint() {
                Some(name) if name.contains("email") => EMAIL_TAKEN,
                _ => NICKNAME_TAKEN,
            };
            StoreError::Conflict(msg.into())
        }
        _ => StoreError::DbError(e),
    }
}

fn tasks_from_rows(rows: Vec<TaskRow>) -> Result<Vec<Task>, StoreError> {
    rows.into_iter().map(Task::try_from).collect()
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, email, nickname FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, email, nickname)| User {
            id,
            email,
            nickname,
        }))
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, nickname, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserWithPassword {
            user: User {
                id: r.id,
                email: r.email,
                nickname: r.nickname,
            },
            password_hash: r.password_hash,
        }))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)")
                .bind(nickname)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create_user(
        &self,
        email: &str,
        nickname: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (id, email, nickname, password_hash) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(Uuid::now_v7())
        .bind(email)
        .bind(nickname)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_or)?;
        Ok(User {
            id,
            email: email.to_string(),
            nickname: nickname.to_string(),
        })
    }

    async fn update_nickname(&self, id: Uuid, nickname: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET nickname = $1 WHERE id = $2")
            .bind(nickname)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(conflict_or)?;
        Ok(())
    }

    async fn list_users_except(&self, exclude: &[Uuid]) -> Result<Vec<UserSummary>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, nickname FROM users WHERE NOT (id = ANY($1)) ORDER BY nickname",
        )
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, nickname)| UserSummary { id, nickname })
            .collect())
    }

    async fn find_user_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, nickname FROM users WHERE id = ANY($1) ORDER BY nickname",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, nickname)| UserSummary { id, nickname })
            .collect())
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn create_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let id = Uuid::now_v7();
        let participants: Vec<Uuid> = project.participants.into_iter().collect();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO projects (id, name, author_id, status, link, deadline) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&project.name)
        .bind(project.author)
        .bind(ProjectStatus::InProgress.as_str())
        .bind(&project.link)
        .bind(project.deadline)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO project_participants (project_id, user_id) \
             SELECT $1, unnest($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&participants)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.find_project(id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("project {id} vanished after insert")))
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} WHERE p.id = $1 GROUP BY p.id"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Project::try_from).transpose()
    }

    async fn list_projects_for(
        &self,
        user_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} \
             WHERE (p.author_id = $1 \
                    OR EXISTS (SELECT 1 FROM project_participants m \
                               WHERE m.project_id = p.id AND m.user_id = $1)) \
               AND ($2::text IS NULL OR p.status = $2) \
             GROUP BY p.id \
             ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(user_id)
        .bind(status.map(ProjectStatus::as_str))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Project::try_from).collect()
    }

    async fn update_project(
        &self,
        id: Uuid,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError> {
        let result = sqlx::query(
            "UPDATE projects \
             SET name = $1, status = COALESCE($2, status), link = $3, deadline = $4, updated_at = now() \
             WHERE id = $5",
        )
        .bind(&update.name)
        .bind(update.status.map(ProjectStatus::as_str))
        .bind(&update.link)
        .bind(update.deadline)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_project(id).await
    }

    async fn add_participants(
        &self,
        id: Uuid,
        users: &[Uuid],
    ) -> Result<Option<Project>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let touched = sqlx::query("UPDATE projects SET updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Ok(None);
        }
        sqlx::query(
            "INSERT INTO project_participants (project_id, user_id) \
             SELECT $1, unnest($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(users)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        self.find_project(id).await
    }

    async fn remove_participant(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Project>, StoreError> {
        sqlx::query("DELETE FROM project_participants WHERE project_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE projects SET updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.find_project(id).await
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        // tasks and participants go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "INSERT INTO tasks (id, name, description, task_type, project_id, assignee_id, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.task_type.as_str())
        .bind(task.project)
        .bind(task.assignee)
        .bind(task.due_date)
        .fetch_one(&self.pool)
        .await?;
        Task::try_from(row)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Task::try_from).transpose()
    }

    async fn list_tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 \
             ORDER BY due_date ASC NULLS LAST, created_at ASC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        tasks_from_rows(rows)
    }

    async fn list_tasks_for_assignee(
        &self,
        user_id: Uuid,
        open_only: bool,
    ) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE assignee_id = $1 AND (NOT $2 OR done = false) \
             ORDER BY due_date ASC NULLS LAST, created_at ASC"
        ))
        .bind(user_id)
        .bind(open_only)
        .fetch_all(&self.pool)
        .await?;
        tasks_from_rows(rows)
    }

    async fn update_task(&self, id: Uuid, update: TaskUpdate) -> Result<Option<Task>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let current = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current.map(Task::try_from).transpose()? else {
            return Ok(None);
        };

        let completed_date = update.completed_date_for(&current, Utc::now());
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE tasks \
             SET name = COALESCE($1, name), \
                 description = COALESCE($2, description), \
                 due_date = COALESCE($3, due_date), \
                 done = COALESCE($4, done), \
                 completed_date = $5, \
                 updated_at = now() \
             WHERE id = $6 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.due_date)
        .bind(update.done)
        .bind(completed_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Task::try_from(row).map(Some)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
