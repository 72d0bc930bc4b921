//! Project/task authorization policy.
//!
//! Every decision starts from [`capability`], the relationship between a user
//! and a project. Tasks have no ACL of their own: a task decision is the
//! decision for its parent project.

use uuid::Uuid;

use crate::models::project::Project;

/// Relationship between a user and a project, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    None,
    Participant,
    Owner,
}

/// What an action needs from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Owner or participant.
    Member,
    /// Owner only.
    Owner,
    /// Caller must currently be listed in `participants` (self-targeted).
    ListedParticipant,
}

/// Operations on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    View,
    ListInvitable,
    CreateTask,
    Invite,
    Update,
    Delete,
    Leave,
}

impl ProjectAction {
    pub const ALL: [ProjectAction; 7] = [
        ProjectAction::View,
        ProjectAction::ListInvitable,
        ProjectAction::CreateTask,
        ProjectAction::Invite,
        ProjectAction::Update,
        ProjectAction::Delete,
        ProjectAction::Leave,
    ];

    pub fn requirement(self) -> Requirement {
        match self {
            ProjectAction::View | ProjectAction::ListInvitable | ProjectAction::CreateTask => {
                Requirement::Member
            }
            ProjectAction::Invite | ProjectAction::Update | ProjectAction::Delete => {
                Requirement::Owner
            }
            ProjectAction::Leave => Requirement::ListedParticipant,
        }
    }
}

/// Operations on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    View,
    Update,
    Delete,
}

impl TaskAction {
    pub const ALL: [TaskAction; 3] = [TaskAction::View, TaskAction::Update, TaskAction::Delete];

    /// Any member of the parent project may act on any of its tasks, not only
    /// the assignee.
    pub fn requirement(self) -> Requirement {
        Requirement::Member
    }
}

/// The caller lacks the capability the action needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("forbidden")]
pub struct Forbidden;

/// Compute the caller's capability on `project`.
pub fn capability(project: &Project, user_id: Uuid) -> Capability {
    if project.author == user_id {
        Capability::Owner
    } else if project.participants.contains(&user_id) {
        Capability::Participant
    } else {
        Capability::None
    }
}

/// Check a requirement against a project.
pub fn satisfies(project: &Project, user_id: Uuid, requirement: Requirement) -> bool {
    match requirement {
        Requirement::Member => capability(project, user_id) >= Capability::Participant,
        Requirement::Owner => capability(project, user_id) == Capability::Owner,
        Requirement::ListedParticipant => project.participants.contains(&user_id),
    }
}

/// Decide a project operation.
pub fn authorize_project(
    project: &Project,
    user_id: Uuid,
    action: ProjectAction,
) -> Result<Capability, Forbidden> {
    if satisfies(project, user_id, action.requirement()) {
        Ok(capability(project, user_id))
    } else {
        Err(Forbidden)
    }
}

/// Decide a task operation via the task's parent project.
pub fn authorize_task(
    parent: &Project,
    user_id: Uuid,
    action: TaskAction,
) -> Result<Capability, Forbidden> {
    if satisfies(parent, user_id, action.requirement()) {
        Ok(capability(parent, user_id))
    } else {
        Err(Forbidden)
    }
}
