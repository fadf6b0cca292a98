//! End-to-end tests for the HTTP API.
//!
//! Each test builds the full router over a fresh in-memory store and drives it
//! with `tower::ServiceExt::oneshot`, so no socket is bound.

use std::sync::Arc;

use adapters::InMemoryStore;
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use backend::{
    app,
    auth::{service::ensure_admin, Identity, AUTH_TOKEN_HEADER},
    config::{AdminSeed, Config},
    state::AppState,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-0123456789abcdef";
const PASSWORD: &str = "hunter2hunter2";

fn test_state() -> Arc<AppState> {
    let config = Config::from_lookup(|key| match key {
        "NEXUS_JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .expect("test config");
    AppState::new(config, Arc::new(InMemoryStore::new()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

/// Signs up and returns `(token, user id)`.
async fn signup(app: &Router, name: &str, email: &str, role: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": PASSWORD, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn health_and_root_are_public() {
    let app = app(test_state());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, _) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_token_identifies_the_new_account() {
    let app = app(test_state());
    let (token, id) = signup(&app, "Ada", "Ada@Example.com", "entrepreneur").await;

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id.as_str());
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["role"], "entrepreneur");
    assert_eq!(me["status"], "active");
    assert_eq!(me["emailVerified"], false);
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn signup_rejects_bad_input() {
    let app = app(test_state());
    signup(&app, "Ada", "ada@example.com", "entrepreneur").await;

    let cases = [
        (json!({ "name": "Eve", "email": "ADA@example.com", "password": PASSWORD }), StatusCode::CONFLICT),
        (json!({ "name": "Eve", "email": "eve@example.com", "password": PASSWORD, "role": "admin" }), StatusCode::BAD_REQUEST),
        (json!({ "name": "Eve", "email": "eve@example.com", "password": "short" }), StatusCode::BAD_REQUEST),
        (json!({ "name": " ", "email": "eve@example.com", "password": PASSWORD }), StatusCode::BAD_REQUEST),
        (json!({ "name": "Eve", "email": "not-an-email", "password": PASSWORD }), StatusCode::BAD_REQUEST),
    ];
    for (body, expected) in cases {
        let (status, response) =
            send(&app, Method::POST, "/api/auth/signup", None, Some(body.clone())).await;
        assert_eq!(status, expected, "{body} -> {response}");
    }
}

#[tokio::test]
async fn login_checks_password() {
    let app = app(test_state());
    let (_, id) = signup(&app, "Ada", "ada@example.com", "investor").await;

    let (status, body) = login(&app, "ada@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = login(&app, "nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = login(&app, " ADA@example.com ", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id.as_str());
    assert_eq!(body["user"]["role"], "investor");
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn credential_failures_are_distinguished() {
    let state = test_state();
    let app = app(state.clone());
    let (token, _) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;

    let (status, body) = send(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication token is missing");

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication token is invalid");

    let identity = state.tokens.validate(Some(token.as_str())).unwrap();
    let stale = state
        .tokens
        .issue_at(&identity, Utc::now() - Duration::days(2))
        .unwrap();
    let (status, body) =
        send(&app, Method::GET, "/api/users/me", Some(stale.token.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication token has expired");
}

#[tokio::test]
async fn custom_token_header_is_accepted() {
    let app = app(test_state());
    let (token, id) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;

    let request = Request::builder()
        .uri("/api/users/me")
        .header(AUTH_TOKEN_HEADER, token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let me: Identity = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(me.id.to_string(), id);
}

#[tokio::test]
async fn marketplace_listings_are_role_gated() {
    let app = app(test_state());
    let (founder, _) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;
    let (investor, investor_id) = signup(&app, "Vc", "vc@example.com", "investor").await;

    let (status, body) =
        send(&app, Method::GET, "/api/users/investors", Some(investor.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You do not have permission to perform this operation");

    let (status, body) =
        send(&app, Method::GET, "/api/users/investors", Some(founder.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![investor_id.as_str()]);

    let (status, body) =
        send(&app, Method::GET, "/api/users/entrepreneurs", Some(investor.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_update_changes_stored_name_only() {
    let app = app(test_state());
    let (token, _) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/users/me",
        Some(token.as_str()),
        Some(json!({ "name": "Ada Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada Lovelace");

    let (_, profile) = send(&app, Method::GET, "/api/users/me", Some(token.as_str()), None).await;
    assert_eq!(profile["name"], "Ada Lovelace");

    // The token still carries the name it was issued with.
    let (_, claims) = send(&app, Method::GET, "/api/auth/me", Some(token.as_str()), None).await;
    assert_eq!(claims["name"], "Ada");
}

#[tokio::test]
async fn admin_manages_account_status() {
    let state = test_state();
    ensure_admin(
        state.store.as_ref(),
        &AdminSeed {
            email: "root@nexus.io".into(),
            password: PASSWORD.into(),
        },
    )
    .await
    .unwrap();
    let app = app(state);

    let (user_token, user_id) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;
    let (status, body) = login(&app, "root@nexus.io", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
    let admin = body["token"].as_str().unwrap().to_string();
    let admin_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::GET, "/api/users", Some(user_token.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/api/users", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/users/{admin_id}/status"),
        Some(admin.as_str()),
        Some(json!({ "status": "suspended" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/users/{user_id}/status"),
        Some(admin.as_str()),
        Some(json!({ "status": "suspended" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "suspended");

    let (status, body) = login(&app, "ada@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is not active");

    // Tokens issued before the status change remain valid until they expire.
    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(user_token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/users/{}/status", uuid::Uuid::new_v4()),
        Some(admin.as_str()),
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meeting_notifications_follow_the_time_windows() {
    let app = app(test_state());
    let (founder, founder_id) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;
    let (investor, investor_id) = signup(&app, "Vc", "vc@example.com", "investor").await;

    let now = Utc::now();
    for (title, start) in [
        ("Tomorrow+", now + Duration::hours(30)),
        ("Deep dive", now + Duration::hours(5)),
        ("Quick sync", now + Duration::minutes(10)),
    ] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/meetings",
            Some(founder.as_str()),
            Some(json!({
                "title": title,
                "startTime": start.to_rfc3339(),
                "participantIds": [&investor_id, &founder_id],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["organizerId"], founder_id.as_str());
        assert_eq!(body["participants"].as_array().unwrap().len(), 1);
        assert_eq!(body["participants"][0]["status"], "pending");
    }

    let (status, body) = send(&app, Method::GET, "/api/meetings", Some(investor.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    for token in [&founder, &investor] {
        let (status, body) =
            send(&app, Method::GET, "/api/meetings/notifications", Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        let feed: Vec<(&str, &str)> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|n| (n["title"].as_str().unwrap(), n["kind"].as_str().unwrap()))
            .collect();
        assert_eq!(feed, vec![("Quick sync", "reminder"), ("Deep dive", "upcoming")]);
    }
}

#[tokio::test]
async fn meeting_creation_is_validated() {
    let state = test_state();
    ensure_admin(
        state.store.as_ref(),
        &AdminSeed {
            email: "root@nexus.io".into(),
            password: PASSWORD.into(),
        },
    )
    .await
    .unwrap();
    let app = app(state);
    let (founder, _) = signup(&app, "Ada", "ada@example.com", "entrepreneur").await;
    let (_, body) = login(&app, "root@nexus.io", PASSWORD).await;
    let admin = body["token"].as_str().unwrap().to_string();

    let start = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let past = (Utc::now() - Duration::hours(1)).to_rfc3339();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/meetings",
        Some(admin.as_str()),
        Some(json!({ "title": "Audit", "startTime": start })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let cases = [
        json!({ "title": "", "startTime": start }),
        json!({ "title": "Late", "startTime": past }),
        json!({ "title": "Backwards", "startTime": start, "endTime": past }),
        json!({ "title": "Ghost", "startTime": start, "participantIds": [uuid::Uuid::new_v4()] }),
    ];
    for body in cases {
        let (status, response) =
            send(&app, Method::POST, "/api/meetings", Some(founder.as_str()), Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {response}");
    }
}
