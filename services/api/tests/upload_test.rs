mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{assert_status, body_json, test_app};
use tower::ServiceExt;
use trivia_core::ports::DatabaseService;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn multipart_body(parts: &[(&str, Option<(&str, &str)>, &str)]) -> (String, String) {
    let mut body = String::new();
    for (name, file, content) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match file {
            Some((file_name, mime)) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                ));
                body.push_str(&format!("Content-Type: {mime}\r\n\r\n"));
            }
            None => {
                body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"));
            }
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
}

async fn upload(
    router: &axum::Router,
    cookie: &str,
    parts: &[(&str, Option<(&str, &str)>, &str)],
) -> axum::http::Response<Body> {
    let (content_type, body) = multipart_body(parts);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/documents")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("request build should succeed");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

#[tokio::test]
async fn uploading_plain_text_stores_the_extracted_text() {
    let app = test_app("[]");
    let (user_id, cookie) = app.seed_user("owner@example.com").await;
    let project = app
        .db
        .create_project(user_id, "Acme", "owner@example.com")
        .await
        .unwrap();
    let router = app.router();

    let response = upload(
        &router,
        &cookie,
        &[
            (
                "file",
                Some(("notes.txt", "text/plain")),
                "Paris is the capital of France.",
            ),
            ("project_id", None, &project.id.to_string()),
        ],
    )
    .await;
    assert_status(&response, StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["file_name"], "notes.txt");
    assert_eq!(body["mime_type"], "text/plain");
    assert_eq!(body["file_content"], "Paris is the capital of France.");
    assert_eq!(body["project_id"], project.id.to_string());

    let documents = app.db.list_documents_for_project(project.id).await.unwrap();
    assert_eq!(documents.len(), 1);
}

#[tokio::test]
async fn uploads_without_a_file_part_are_rejected() {
    let app = test_app("[]");
    let (_, cookie) = app.seed_user("owner@example.com").await;
    let router = app.router();

    let response = upload(&router, &cookie, &[("project_id", None, "not-a-file")]).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_file_types_are_rejected_with_415() {
    let app = test_app("[]");
    let (_, cookie) = app.seed_user("owner@example.com").await;
    let router = app.router();

    let response = upload(
        &router,
        &cookie,
        &[("file", Some(("photo.png", "image/png")), "binaryish")],
    )
    .await;
    assert_status(&response, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn uploads_require_authentication() {
    let app = test_app("[]");
    let router = app.router();

    let (content_type, body) = multipart_body(&[(
        "file",
        Some(("notes.txt", "text/plain")),
        "anonymous text",
    )]);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/documents")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("request build should succeed");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_status(&response, StatusCode::UNAUTHORIZED);
}
