//! # taskboard_api
//!
//! HTTP API library for Taskboard.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use taskboard_core::auth::AuthError;
use taskboard_core::auth::jwt::TokenCodec;
use taskboard_core::store::Store;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{auth, projects, tasks, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity and resource persistence.
    pub store: Arc<dyn Store>,
    /// Token codec built from the configured secrets.
    pub codec: Arc<TokenCodec>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Build state, constructing the token codec from `config.secrets`.
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Result<Self, AuthError> {
        let codec = TokenCodec::new(&config.secrets)?;
        Ok(Self {
            store,
            codec: Arc::new(codec),
            config,
        })
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(origin, "invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Token renewal (refresh cookies required)
    let refresh = Router::new()
        .route("/auth/refresh", post(auth::refresh_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_refresh,
        ));

    // Resource-scoped routes: ids are format-checked before any lookup
    let by_id = Router::new()
        .route("/projects/{project_id}", get(projects::get_project_handler))
        .route(
            "/projects/{project_id}/users-to-invite",
            get(projects::users_to_invite_handler),
        )
        .route(
            "/projects/{project_id}/invite",
            post(projects::invite_handler),
        )
        .route(
            "/projects/{project_id}/update",
            post(projects::update_project_handler),
        )
        .route(
            "/projects/{project_id}/leave",
            post(projects::leave_project_handler),
        )
        .route(
            "/projects/{project_id}/delete",
            post(projects::delete_project_handler),
        )
        .route(
            "/projects/{project_id}/create-task",
            post(projects::create_task_handler),
        )
        .route("/tasks/{task_id}", get(tasks::get_task_handler))
        .route("/tasks/{task_id}/update", post(tasks::update_task_handler))
        .route("/tasks/{task_id}/delete", post(tasks::delete_task_handler))
        .route_layer(axum::middleware::from_fn(
            middleware::resource_id::require_valid_ids,
        ));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/projects", get(projects::list_in_progress_handler))
        .route("/projects/all", get(projects::list_all_handler))
        .route("/projects/assignees", get(projects::assignees_handler))
        .route("/projects/create", post(projects::create_project_handler))
        .route("/tasks", get(tasks::list_open_tasks_handler))
        .route("/tasks/all", get(tasks::list_all_tasks_handler))
        .route("/users", get(users::list_users_handler))
        .route(
            "/users/update-nickname",
            post(users::update_nickname_handler),
        )
        .merge(by_id)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(refresh)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
