//! services/api/src/web/trivia.rs
//!
//! The owner-facing editor surface: fetch, save, publish. Respondents never
//! touch these routes; the public play surface lives in `web/play.rs`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use trivia_core::domain::{TriviaExperience, TriviaQuestion};
use trivia_core::editor::validate_questions;
use trivia_core::ports::TriviaUpdate;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{port_error, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// The editor's `save()` payload. Absent fields are left untouched; present
/// fields overwrite the stored value entirely. Last write wins.
#[derive(Deserialize, ToSchema)]
pub struct SaveTriviaRequest {
    pub title: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub questions: Option<Vec<TriviaQuestion>>,
}

#[derive(Serialize, ToSchema)]
pub struct PublishResponse {
    #[schema(value_type = Object)]
    pub trivia: TriviaExperience,
    /// The public play link for the shared experience.
    pub url: String,
}

/// Loads the experience and enforces ownership; the shared precondition of
/// every editor operation.
async fn owned_trivia(
    state: &AppState,
    user_id: Uuid,
    trivia_id: Uuid,
) -> Result<TriviaExperience, (StatusCode, String)> {
    let trivia = state
        .db
        .get_trivia_by_id(trivia_id)
        .await
        .map_err(port_error)?;
    if trivia.user_id != user_id {
        return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
    }
    Ok(trivia)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /trivia/{id} - Fetch an experience for editing.
#[utoipa::path(
    get,
    path = "/trivia/{id}",
    params(("id" = Uuid, Path, description = "Trivia experience id")),
    responses(
        (status = 200, description = "The experience"),
        (status = 403, description = "Caller does not own the experience"),
        (status = 404, description = "No such experience")
    )
)]
pub async fn get_trivia_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(trivia_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let trivia = owned_trivia(&state, user_id, trivia_id).await?;
    Ok(Json(trivia))
}

/// PUT /trivia/{id} - Persist the editor's working copy.
///
/// Title and question list are saved as one atomic unit. Question sets are
/// validated against the four-option invariant before anything is written.
#[utoipa::path(
    put,
    path = "/trivia/{id}",
    params(("id" = Uuid, Path, description = "Trivia experience id")),
    request_body = SaveTriviaRequest,
    responses(
        (status = 200, description = "Updated experience"),
        (status = 400, description = "A question violates the four-option invariant"),
        (status = 403, description = "Caller does not own the experience"),
        (status = 404, description = "No such experience")
    )
)]
pub async fn save_trivia_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(trivia_id): Path<Uuid>,
    Json(req): Json<SaveTriviaRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    owned_trivia(&state, user_id, trivia_id).await?;

    if let Some(questions) = &req.questions {
        validate_questions(questions)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    }

    let trivia = state
        .db
        .update_trivia_experience(
            trivia_id,
            TriviaUpdate {
                title: req.title,
                questions: req.questions,
            },
        )
        .await
        .map_err(port_error)?;

    Ok(Json(trivia))
}

/// POST /trivia/{id}/share - Publish an experience.
///
/// Sets the share slug (the experience's own id) when unset; publishing is
/// one-way and idempotent, and every call refreshes `updated_at`.
#[utoipa::path(
    post,
    path = "/trivia/{id}/share",
    params(("id" = Uuid, Path, description = "Trivia experience id")),
    responses(
        (status = 200, description = "Published experience with its play URL", body = PublishResponse),
        (status = 403, description = "Caller does not own the experience"),
        (status = 404, description = "No such experience")
    )
)]
pub async fn publish_trivia_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(trivia_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    owned_trivia(&state, user_id, trivia_id).await?;

    let trivia = state.db.publish_trivia(trivia_id).await.map_err(port_error)?;

    let slug = trivia.share_slug.clone().unwrap_or_else(|| trivia.id.to_string());
    let url = format!("{}/play/{slug}", state.config.public_base_url);

    Ok(Json(PublishResponse { trivia, url }))
}
