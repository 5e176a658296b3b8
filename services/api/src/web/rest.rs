//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification. The handlers
//! themselves live in the sibling modules; this ties their `utoipa::path`
//! annotations and schemas into one document.

use utoipa::OpenApi;

use crate::web::{analytics, auth, documents, play, projects, trivia};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        projects::create_project_handler,
        projects::list_projects_handler,
        projects::get_project_handler,
        documents::upload_document_handler,
        documents::convert_document_handler,
        trivia::get_trivia_handler,
        trivia::save_trivia_handler,
        trivia::publish_trivia_handler,
        play::fetch_experience_handler,
        play::start_session_handler,
        play::answer_handler,
        play::continue_handler,
        play::session_snapshot_handler,
        analytics::ingest_event_handler,
        analytics::analytics_summary_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            projects::CreateProjectRequest,
            projects::ProjectDetailResponse,
            documents::ConvertDocumentRequest,
            trivia::SaveTriviaRequest,
            trivia::PublishResponse,
            play::AnswerRequest,
            play::StartSessionResponse,
            play::AnswerResponse,
            play::ContinueResponse,
            play::SessionSnapshot,
            analytics::IngestEventRequest,
            analytics::AnalyticsSummary,
        )
    ),
    tags(
        (name = "Trivia API", description = "API endpoints for turning documents into shareable trivia.")
    )
)]
pub struct ApiDoc;
