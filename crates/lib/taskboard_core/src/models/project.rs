//! Project and task domain models.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "In progress")]
    InProgress,
    Finished,
    Dropped,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "In progress",
            ProjectStatus::Finished => "Finished",
            ProjectStatus::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In progress" => Ok(ProjectStatus::InProgress),
            "Finished" => Ok(ProjectStatus::Finished),
            "Dropped" => Ok(ProjectStatus::Dropped),
            other => Err(format!("unknown project status '{other}'")),
        }
    }
}

/// A project. `author` is fixed at creation; `participants` is a set and
/// never needs to contain the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub author: Uuid,
    pub participants: BTreeSet<Uuid>,
    pub status: ProjectStatus,
    pub link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Author plus participants.
    pub fn members(&self) -> impl Iterator<Item = Uuid> + '_ {
        std::iter::once(self.author).chain(
            self.participants
                .iter()
                .copied()
                .filter(move |id| *id != self.author),
        )
    }
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub author: Uuid,
    pub participants: BTreeSet<Uuid>,
    pub link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Owner-only project edit. `link` and `deadline` are replaced wholesale
/// (absent clears them); `status` is kept when absent.
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub name: String,
    pub status: Option<ProjectStatus>,
    pub link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Kind of task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    Issue,
    #[default]
    Task,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Issue => "Issue",
            TaskType::Task => "Task",
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Issue" => Ok(TaskType::Issue),
            "Task" => Ok(TaskType::Task),
            other => Err(format!("unknown task type '{other}'")),
        }
    }
}

/// A task. Carries no authorization data of its own: every access decision
/// goes through the parent project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub project: Uuid,
    pub assignee: Uuid,
    pub done: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub project: Uuid,
    pub assignee: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task edit. Fields left `None` keep their stored value, except
/// `completed_date` which is always written as computed by
/// [`TaskUpdate::completed_date_for`].
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: Option<bool>,
}

impl TaskUpdate {
    /// Completion timestamp after applying this update to `current`.
    ///
    /// Marking a task done stamps `now`; re-marking an already done task keeps
    /// the original stamp; anything that leaves the task not done clears it.
    pub fn completed_date_for(&self, current: &Task, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let done = self.done.unwrap_or(current.done);
        match (done, current.done) {
            (true, true) => current.completed_date.or(Some(now)),
            (true, false) => Some(now),
            (false, _) => None,
        }
    }
}
