//! Request body extraction.
//!
//! Routes that address a project or task by id must answer 404 or 403 before
//! anything about the body is reported. [`JsonBody`] reads the raw bytes
//! without judging them; the service parses them once the resource has been
//! found and the caller authorized.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// A request body held back until the caller is allowed to act.
///
/// The `Content-Type` header is not checked. An empty body reads as `{}`.
#[derive(Debug, Clone, Default)]
pub struct JsonBody(Bytes);

impl JsonBody {
    /// Deserialize the held body. Parser errors become a generic 422.
    pub fn parse<T: DeserializeOwned>(&self) -> AppResult<T> {
        let bytes: &[u8] = if self.0.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &self.0
        };
        serde_json::from_slice(bytes).map_err(AppError::malformed_body)
    }
}

impl From<serde_json::Value> for JsonBody {
    fn from(value: serde_json::Value) -> Self {
        JsonBody(Bytes::from(value.to_string()))
    }
}

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Bytes::from_request(req, state)
            .await
            .map(JsonBody)
            .map_err(|rejection| AppError::malformed_body(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InviteRequest, UpdateProjectRequest};
    use serde_json::json;

    #[test]
    fn empty_body_reads_as_empty_object() {
        let req: InviteRequest = JsonBody::default().parse().unwrap();
        assert!(req.participants.is_empty());
    }

    #[test]
    fn non_object_body_is_a_body_field_error() {
        let err = JsonBody::from(json!([1, 2]))
            .parse::<UpdateProjectRequest>()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e[0].field == "body"));
    }

    #[test]
    fn garbage_is_rejected_at_parse_time() {
        let body = JsonBody(Bytes::from_static(b"name=Alpha"));
        assert!(body.parse::<UpdateProjectRequest>().is_err());
    }
}
