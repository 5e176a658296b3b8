mod common;

use axum::http::{Method, StatusCode};
use common::{assert_status, send_json, test_app};
use serde_json::json;
use trivia_core::ports::DatabaseService;

#[tokio::test]
async fn protected_routes_reject_requests_without_a_session_cookie() {
    let app = test_app("[]");
    let router = app.router();
    let id = uuid::Uuid::new_v4();

    let cases = [
        (Method::GET, format!("/projects")),
        (Method::GET, format!("/projects/{id}")),
        (Method::GET, format!("/trivia/{id}")),
        (Method::POST, format!("/trivia/{id}/share")),
        (Method::GET, format!("/analytics/{id}")),
        (Method::POST, format!("/documents/{id}/trivia")),
    ];

    for (method, uri) in cases {
        let response = send_json(&router, method, &uri, None, None).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "expected UNAUTHORIZED for {uri}",
        );
    }
}

#[tokio::test]
async fn an_expired_session_is_rejected() {
    let app = test_app("[]");
    let (user_id, _) = app.seed_user("owner@example.com").await;
    app.db
        .create_auth_session(
            "stale-token",
            user_id,
            chrono::Utc::now() - chrono::Duration::hours(1),
        )
        .await
        .unwrap();
    let router = app.router();

    let response = send_json(
        &router,
        Method::GET,
        "/projects",
        Some("session=stale-token"),
        None,
    )
    .await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn a_valid_session_cookie_passes_the_guard() {
    let app = test_app("[]");
    let (_, cookie) = app.seed_user("owner@example.com").await;
    let router = app.router();

    let response = send_json(&router, Method::GET, "/projects", Some(&cookie), None).await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn signup_and_login_issue_working_sessions() {
    let app = test_app("[]");
    let router = app.router();

    let response = send_json(
        &router,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "new@example.com", "password": "hunter2!" })),
    )
    .await;
    assert_status(&response, StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("signup should set a session cookie")
        .to_string();

    let response = send_json(&router, Method::GET, "/projects", Some(&cookie), None).await;
    assert_status(&response, StatusCode::OK);

    // Login with the same credentials issues a fresh session.
    let response = send_json(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "new@example.com", "password": "hunter2!" })),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    // A wrong password does not.
    let response = send_json(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "new@example.com", "password": "wrong" })),
    )
    .await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
}
