//! Resource id guard.
//!
//! Runs after the access guard on every `{project_id}` / `{task_id}` route.
//! An id that is not a UUID cannot name anything, so it is answered the same
//! way as an id that names nothing: a bare 404.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;

/// Axum middleware: reject the request with 404 unless every path parameter
/// parses as a UUID.
pub async fn require_valid_ids(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some((name, value)) = params.iter().find(|(_, v)| Uuid::parse_str(v).is_err()) {
        debug!(param = %name, %value, "malformed resource id");
        return Err(AppError::NotFound);
    }
    Ok(next.run(request).await)
}
