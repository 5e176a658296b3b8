//! services/api/src/web/projects.rs
//!
//! Project intake and listing. A project is the container a client's
//! documents and trivia experiences hang off; every entity below it is owned
//! by the creating user, and ownership is the only authorization model.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use trivia_core::domain::{Document, Project, TriviaExperience};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{port_error, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub business_name: String,
    pub contact_email: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectDetailResponse {
    #[schema(value_type = Object)]
    pub project: Project,
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<Document>,
    #[schema(value_type = Vec<Object>)]
    pub trivia_experiences: Vec<TriviaExperience>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /projects - Register a new client project.
#[utoipa::path(
    post,
    path = "/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created"),
        (status = 400, description = "Missing business name or contact email"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.business_name.is_empty() || req.contact_email.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Business name and contact email are required".to_string(),
        ));
    }

    let project = state
        .db
        .create_project(user_id, &req.business_name, &req.contact_email)
        .await
        .map_err(port_error)?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects - List the caller's projects, newest first.
#[utoipa::path(
    get,
    path = "/projects",
    responses(
        (status = 200, description = "The caller's projects"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let projects = state
        .db
        .list_projects_for_user(user_id)
        .await
        .map_err(port_error)?;
    Ok(Json(projects))
}

/// GET /projects/{id} - A project with its documents and trivia experiences.
#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetailResponse),
        (status = 403, description = "Caller does not own the project"),
        (status = 404, description = "No such project")
    )
)]
pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let project = state
        .db
        .get_project_by_id(project_id)
        .await
        .map_err(port_error)?;

    if project.user_id != user_id {
        return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
    }

    let documents = state
        .db
        .list_documents_for_project(project_id)
        .await
        .map_err(port_error)?;
    let trivia_experiences = state
        .db
        .list_trivia_for_project(project_id)
        .await
        .map_err(port_error)?;

    Ok(Json(ProjectDetailResponse {
        project,
        documents,
        trivia_experiences,
    }))
}
