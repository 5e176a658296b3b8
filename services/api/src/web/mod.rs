//! services/api/src/web/mod.rs
//!
//! The web layer: route wiring, handlers, auth middleware, and the shared
//! error mapping from port failures to HTTP responses.

pub mod analytics;
pub mod auth;
pub mod documents;
pub mod middleware;
pub mod play;
pub mod projects;
pub mod rest;
pub mod state;
pub mod trivia;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tracing::error;
use trivia_core::ports::PortError;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;

/// Maps a port failure to the status/message tuple handlers respond with.
pub(crate) fn port_error(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
        PortError::Unexpected(message) => {
            error!("storage failure: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

/// Builds the application router. Public routes carry no auth; everything
/// owner-facing sits behind [`require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/play/{slug}", get(play::fetch_experience_handler))
        .route("/play/{slug}/sessions", post(play::start_session_handler))
        .route(
            "/play/sessions/{session_id}",
            get(play::session_snapshot_handler),
        )
        .route(
            "/play/sessions/{session_id}/answers",
            post(play::answer_handler),
        )
        .route(
            "/play/sessions/{session_id}/continue",
            post(play::continue_handler),
        )
        .route("/analytics", post(analytics::ingest_event_handler));

    let protected_routes = Router::new()
        .route(
            "/projects",
            post(projects::create_project_handler).get(projects::list_projects_handler),
        )
        .route("/projects/{id}", get(projects::get_project_handler))
        .route("/documents", post(documents::upload_document_handler))
        .route(
            "/documents/{id}/trivia",
            post(documents::convert_document_handler),
        )
        .route(
            "/trivia/{id}",
            get(trivia::get_trivia_handler).put(trivia::save_trivia_handler),
        )
        .route("/trivia/{id}/share", post(trivia::publish_trivia_handler))
        .route(
            "/analytics/{id}",
            get(analytics::analytics_summary_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state)
}
