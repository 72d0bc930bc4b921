//! API request and response bodies (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use taskboard_core::models::auth::UserSummary;
use taskboard_core::models::project::{Project, Task};
use uuid::Uuid;

/// Accept either a single string or a list of strings; missing or empty
/// string means an empty list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// Text fields take any JSON scalar, so a mistyped value is reported by the
/// field's own validation rule. Arrays and objects read as empty text.
fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(String::new()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Option::<Value>::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Option::<Value>::deserialize(deserializer)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nickname: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(default, alias = "confirm_password", deserialize_with = "lenient_string")]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
}

/// Body of a successful signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub nickname: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub participants: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    #[serde(default, deserialize_with = "one_or_many")]
    pub participants: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub link: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// A project with its tasks and member summaries.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<Task>,
}

/// A project with its members, for choosing a task assignee.
#[derive(Debug, Serialize)]
pub struct ProjectAssignees {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub project: Project,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub task_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub assignee: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNicknameRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub nickname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_accepts_single_id_or_list() {
        let one: InviteRequest = serde_json::from_str(r#"{"participants":"abc"}"#).unwrap();
        assert_eq!(one.participants, vec!["abc"]);

        let many: InviteRequest =
            serde_json::from_str(r#"{"participants":["a","b"]}"#).unwrap();
        assert_eq!(many.participants, vec!["a", "b"]);

        let empty: InviteRequest = serde_json::from_str(r#"{"participants":""}"#).unwrap();
        assert!(empty.participants.is_empty());

        let missing: InviteRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.participants.is_empty());
    }

    #[test]
    fn signup_accepts_snake_case_confirmation() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"email":"a@b.co","nickname":"n","password":"p","confirm_password":"p"}"#,
        )
        .unwrap();
        assert_eq!(req.confirm_password, "p");
    }

    #[test]
    fn mistyped_text_fields_still_deserialize() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"email":1,"nickname":true,"password":["x"]}"#).unwrap();
        assert_eq!(req.email, "1");
        assert_eq!(req.nickname, "true");
        assert_eq!(req.password, "");
        assert_eq!(req.confirm_password, "");

        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"name":null,"description":7}"#).unwrap();
        assert_eq!(req.name, None);
        assert_eq!(req.description.as_deref(), Some("7"));
    }
}
