//! Shared helpers for router-level tests over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::{Value, json};
use taskboard_api::config::ApiConfig;
use taskboard_api::{AppState, router};
use taskboard_core::auth::jwt::TokenSecrets;
use taskboard_core::store::memory::MemoryStore;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: String::new(),
        secrets: TokenSecrets {
            access: "test-access-secret".into(),
            refresh: "test-refresh-secret".into(),
        },
        cors_origin: "http://localhost:3000".into(),
        cookie_secure: true,
    }
}

pub fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), test_config()).expect("app state");
    router(state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("parse JSON")
    }

    /// `name=value` pairs from every `Set-Cookie` header.
    pub fn cookie_pairs(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .map(str::to_string)
            .collect()
    }

    pub fn set_cookie_lines(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// A POST with a raw body and no `Content-Type`.
pub fn post_raw(uri: &str, token: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request")
}

pub fn post_with_cookies(uri: &str, cookies: &[String]) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies.join("; "));
    }
    builder.body(Body::empty()).expect("request")
}

/// `field` of every entry in a 422 `errors` array.
pub fn error_fields(resp: &TestResponse) -> Vec<String> {
    resp.json()["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .map(str::to_string)
        .collect()
}

pub fn signup_body(email: &str, nickname: &str) -> Value {
    json!({
        "email": email,
        "nickname": nickname,
        "password": PASSWORD,
        "confirmPassword": PASSWORD,
    })
}

/// A signed-up user: access token, id and refresh cookie pairs.
pub struct Session {
    pub token: String,
    pub id: String,
    pub cookies: Vec<String>,
}

pub async fn signup(app: &Router, email: &str, nickname: &str) -> Session {
    let resp = send(app, post_json("/auth/signup", None, signup_body(email, nickname))).await;
    assert_eq!(resp.status, StatusCode::OK, "signup {nickname}");
    let json = resp.json();
    Session {
        token: json["token"].as_str().expect("token").to_string(),
        id: json["id"].as_str().expect("id").to_string(),
        cookies: resp.cookie_pairs(),
    }
}

/// Create a project as `owner` and return its id.
pub async fn create_project(app: &Router, owner: &Session, name: &str) -> String {
    let resp = send(
        app,
        post_json("/projects/create", Some(&owner.token), json!({ "name": name })),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "create project");
    resp.json()["id"].as_str().expect("project id").to_string()
}
