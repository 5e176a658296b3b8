//! services/api/src/web/analytics.rs
//!
//! The analytics ingestion endpoint and the owner-facing aggregates.
//! Ingestion is public (respondents are anonymous) and writes synchronously;
//! the fire-and-forget path in `crate::analytics` is for events the server
//! emits on its own behalf.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use trivia_core::domain::{AnalyticsEvent, EventKind, NewAnalyticsEvent};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{port_error, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Ingestion payload. `experience_id`, `project_id` and `event_type` are
/// required; a request missing any of them is rejected before it reaches the
/// handler body.
#[derive(Deserialize, ToSchema)]
pub struct IngestEventRequest {
    pub experience_id: Uuid,
    pub project_id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub event_type: EventKind,
    pub question_index: Option<u32>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Deserialize, ToSchema)]
pub struct AnalyticsQuery {
    /// `experience` (default) or `project`.
    pub scope: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub views: usize,
    pub starts: usize,
    pub completions: usize,
    pub completion_rate: f64,
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<AnalyticsEvent>,
}

fn summarize(events: Vec<AnalyticsEvent>) -> AnalyticsSummary {
    let count = |kind: EventKind| events.iter().filter(|e| e.event_type == kind).count();
    let views = count(EventKind::View);
    let starts = count(EventKind::Start);
    let completions = count(EventKind::QuizComplete);
    let completion_rate = if starts > 0 {
        completions as f64 / starts as f64 * 100.0
    } else {
        0.0
    };
    AnalyticsSummary {
        views,
        starts,
        completions,
        completion_rate,
        events,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /analytics - Record one analytics event.
#[utoipa::path(
    post,
    path = "/analytics",
    request_body = IngestEventRequest,
    responses(
        (status = 201, description = "Event recorded"),
        (status = 422, description = "Missing or malformed required fields")
    )
)]
pub async fn ingest_event_handler(
    State(state): State<AppState>,
    Json(req): Json<IngestEventRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let event = state
        .db
        .record_analytics_event(NewAnalyticsEvent {
            experience_id: req.experience_id,
            project_id: req.project_id,
            user_id: req.user_id,
            event_type: req.event_type,
            question_index: req.question_index,
            metadata: req.metadata.unwrap_or_else(|| serde_json::json!({})),
        })
        .await
        .map_err(port_error)?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /analytics/{id} - Aggregated events for an experience or a project.
///
/// `?scope=project` treats the id as a project id; the default treats it as
/// an experience id. Events are returned newest first alongside view/start/
/// completion counts and the completion rate.
#[utoipa::path(
    get,
    path = "/analytics/{id}",
    params(
        ("id" = Uuid, Path, description = "Experience or project id"),
        ("scope" = Option<String>, Query, description = "experience (default) or project")
    ),
    responses(
        (status = 200, description = "Event list and aggregates", body = AnalyticsSummary),
        (status = 400, description = "Unknown scope"),
        (status = 403, description = "Caller does not own the target"),
        (status = 404, description = "No such experience or project")
    )
)]
pub async fn analytics_summary_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let events = match query.scope.as_deref() {
        Some("project") => {
            let project = state.db.get_project_by_id(id).await.map_err(port_error)?;
            if project.user_id != user_id {
                return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
            }
            state.db.list_events_for_project(id).await.map_err(port_error)?
        }
        None | Some("experience") => {
            let trivia = state.db.get_trivia_by_id(id).await.map_err(port_error)?;
            if trivia.user_id != user_id {
                return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
            }
            state
                .db
                .list_events_for_experience(id)
                .await
                .map_err(port_error)?
        }
        Some(other) => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unknown analytics scope '{other}'"),
            ));
        }
    };

    Ok(Json(summarize(events)))
}
