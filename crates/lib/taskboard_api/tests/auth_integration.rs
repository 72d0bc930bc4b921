//! Auth flows end to end: signup, login, refresh via split cookies, logout.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn signup_returns_token_and_rejects_duplicate_nickname() {
    let app = app();

    let resp = send(&app, post_json("/auth/signup", None, signup_body("t@example.com", "test"))).await;
    assert_eq!(resp.status, StatusCode::OK);
    let json = resp.json();
    assert!(!json["token"].as_str().unwrap().is_empty());
    assert_eq!(json["nickname"], "test");
    assert_eq!(resp.cookie_pairs().len(), 2);

    let resp = send(
        &app,
        post_json("/auth/signup", None, signup_body("other@example.com", "test")),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert!(resp.json()["errors"][0]["msg"].is_string());
}

#[tokio::test]
async fn signup_validation_reports_fields() {
    let app = app();
    let resp = send(
        &app,
        post_json(
            "/auth/signup",
            None,
            json!({
                "email": "not-an-email",
                "nickname": "ok",
                "password": "short",
                "confirmPassword": "short",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<String> = resp.json()["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"password".to_string()));
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = app();
    signup(&app, "a@example.com", "alice").await;

    let resp = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({ "email": "a@example.com", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body.is_empty());

    let resp = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({ "email": "a@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["nickname"], "alice");
}

#[tokio::test]
async fn refresh_cookies_are_split_and_scoped() {
    let app = app();
    let resp = send(&app, post_json("/auth/signup", None, signup_body("a@example.com", "alice"))).await;
    let lines = resp.set_cookie_lines();

    let hp = lines
        .iter()
        .find(|l| l.starts_with("refresh_token_hp="))
        .unwrap();
    let s = lines
        .iter()
        .find(|l| l.starts_with("refresh_token_s="))
        .unwrap();
    assert!(hp.contains("HttpOnly"));
    assert!(!s.contains("HttpOnly"));
    for line in [hp, s] {
        assert!(line.contains("Secure"));
        assert!(line.contains("SameSite=Strict"));
        assert!(line.contains("Path=/auth"));
    }
}

#[tokio::test]
async fn refresh_mints_a_working_access_token() {
    let app = app();
    let session = signup(&app, "a@example.com", "alice").await;

    let resp = send(&app, post_with_cookies("/auth/refresh", &session.cookies)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let token = resp.json()["token"].as_str().unwrap().to_string();
    assert!(resp.cookie_pairs().is_empty());

    let resp = send(&app, get("/projects", Some(&token))).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_requires_both_intact_halves() {
    let app = app();
    let session = signup(&app, "a@example.com", "alice").await;

    let resp = send(&app, post_with_cookies("/auth/refresh", &[])).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body.is_empty());

    let hp_only: Vec<String> = session
        .cookies
        .iter()
        .filter(|c| c.starts_with("refresh_token_hp="))
        .cloned()
        .collect();
    let resp = send(&app, post_with_cookies("/auth/refresh", &hp_only)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let tampered: Vec<String> = session
        .cookies
        .iter()
        .map(|c| match c.strip_prefix("refresh_token_s=") {
            Some(sig) => {
                let flipped = if sig.starts_with('A') { 'B' } else { 'A' };
                format!("refresh_token_s={flipped}{}", &sig[1..])
            }
            None => c.clone(),
        })
        .collect();
    let resp = send(&app, post_with_cookies("/auth/refresh", &tampered)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_is_not_a_refresh_token() {
    let app = app();
    let session = signup(&app, "a@example.com", "alice").await;

    let (hp, sig) = session.token.rsplit_once('.').unwrap();
    let cookies = vec![
        format!("refresh_token_hp={hp}"),
        format!("refresh_token_s={sig}"),
    ];
    let resp = send(&app, post_with_cookies("/auth/refresh", &cookies)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_expires_both_cookies() {
    let app = app();
    let resp = send(&app, post_with_cookies("/auth/logout", &[])).await;
    assert_eq!(resp.status, StatusCode::OK);

    let lines = resp.set_cookie_lines();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!(line.contains("Max-Age=0"), "{line}");
        assert!(line.contains("Path=/auth"), "{line}");
    }
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_bearer() {
    let app = app();

    let resp = send(&app, get("/projects", None)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body.is_empty());

    let resp = send(&app, get("/tasks", Some("not.a.jwt"))).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn mistyped_or_non_json_bodies_use_the_error_envelope() {
    let app = app();
    let mut body = signup_body("a@example.com", "alice");
    body["email"] = json!(1);
    let resp = send(&app, post_json("/auth/signup", None, body)).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&resp), vec!["email"]);
    let text = String::from_utf8(resp.body.clone()).unwrap();
    assert!(!text.contains("invalid type"));

    let resp = send(&app, post_raw("/auth/login", None, "email=a@example.com")).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&resp), vec!["body"]);

    let resp = send(
        &app,
        post_json("/auth/login", None, json!(["a@example.com", PASSWORD])),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&resp), vec!["body"]);
}
