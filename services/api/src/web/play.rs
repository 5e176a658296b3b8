//! services/api/src/web/play.rs
//!
//! The public play surface. No authentication: anything reachable here was
//! explicitly published by its owner. Each handler drives the core
//! `QuizSession` state machine and forwards the returned events to the
//! analytics emitter; telemetry never blocks a response.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use trivia_core::domain::TriviaExperience;
use trivia_core::session::{QuizPhase, SessionError, SessionEvent, REVEAL_MILLIS};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::analytics::view_event;
use crate::web::{port_error, state::{AppState, PlaySession}};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub option_index: usize,
}

#[derive(Serialize, ToSchema)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub experience_id: Uuid,
    pub current_question: usize,
    pub total: usize,
}

#[derive(Serialize, ToSchema)]
pub struct AnswerResponse {
    pub question_index: usize,
    pub selected: usize,
    pub correct: bool,
    pub correct_answer: usize,
    /// True when this request repeated an already-answered question; the
    /// original answer stands and nothing was re-recorded.
    pub already_answered: bool,
    pub completed: bool,
    pub score: Option<usize>,
    pub total: Option<usize>,
    pub percent: Option<u32>,
    /// How long the caller should show the correctness reveal before
    /// requesting the next question.
    pub reveal_millis: u64,
}

#[derive(Serialize, ToSchema)]
pub struct ContinueResponse {
    pub current_question: usize,
}

#[derive(Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub experience_id: Uuid,
    pub phase: String,
    pub current_question: Option<usize>,
    pub answered: usize,
    pub score: usize,
    pub total: usize,
}

fn session_error(e: SessionError) -> (StatusCode, String) {
    let status = match e {
        SessionError::OptionOutOfRange(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::CONFLICT,
    };
    (status, e.to_string())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /play/{slug} - Fetch a published experience.
///
/// Records one `view` event per fetch (one fetch per page load).
#[utoipa::path(
    get,
    path = "/play/{slug}",
    params(("slug" = String, Path, description = "Share slug of a published experience")),
    responses(
        (status = 200, description = "The question set"),
        (status = 404, description = "Unknown or unpublished slug")
    )
)]
pub async fn fetch_experience_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let trivia = state
        .db
        .get_trivia_by_slug(&slug)
        .await
        .map_err(port_error)?;

    state.analytics.emit(view_event(&trivia));

    Ok(Json(trivia))
}

/// POST /play/{slug}/sessions - Start a playthrough.
///
/// Creates a transient session over a snapshot of the question set and
/// emits the `start` event. An experience with no questions is not playable.
#[utoipa::path(
    post,
    path = "/play/{slug}/sessions",
    params(("slug" = String, Path, description = "Share slug of a published experience")),
    responses(
        (status = 201, description = "Session created", body = StartSessionResponse),
        (status = 404, description = "Unknown or unpublished slug"),
        (status = 409, description = "The experience has no questions")
    )
)]
pub async fn start_session_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let trivia = state
        .db
        .get_trivia_by_slug(&slug)
        .await
        .map_err(port_error)?;

    let mut play = PlaySession::new(trivia);
    let started = play.session.start().map_err(session_error)?;

    let experience = play.experience.clone();
    let total = play.session.total();
    let session_id = state.sessions.insert(play);

    state.analytics.emit_session_event(&experience, &started);

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id,
            experience_id: experience.id,
            current_question: 0,
            total,
        }),
    ))
}

/// POST /play/sessions/{session_id}/answers - Answer the current question.
///
/// First answer wins: repeating an answered question changes nothing and
/// emits nothing. Answering the last question completes the session, which
/// is then dropped from the store; the final response carries the score.
#[utoipa::path(
    post,
    path = "/play/sessions/{session_id}/answers",
    params(("session_id" = Uuid, Path, description = "Playthrough session id")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer outcome", body = AnswerResponse),
        (status = 400, description = "Option index out of range"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not awaiting an answer")
    )
)]
pub async fn answer_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    struct Outcome {
        events: Vec<SessionEvent>,
        experience: TriviaExperience,
        response: AnswerResponse,
    }

    let outcome = state
        .sessions
        .with_session(session_id, |play| {
            let events = play.session.select_answer(req.option_index)?;

            let question_index = play
                .session
                .current_question_index()
                .unwrap_or_else(|| play.session.total() - 1);
            let record = play.session.answers()[question_index];
            let completed = play.session.is_completed();

            Ok::<_, SessionError>(Outcome {
                events,
                experience: play.experience.clone(),
                response: AnswerResponse {
                    question_index,
                    selected: record.selected.unwrap_or(req.option_index),
                    correct: record.correct.unwrap_or(false),
                    correct_answer: play.session.questions()[question_index].correct_answer,
                    already_answered: false,
                    completed,
                    score: completed.then(|| play.session.score()),
                    total: completed.then(|| play.session.total()),
                    percent: completed.then(|| play.session.completion_percent()),
                    reveal_millis: REVEAL_MILLIS,
                },
            })
        })
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Unknown session".to_string()))?
        .map_err(session_error)?;

    let Outcome {
        events,
        experience,
        mut response,
    } = outcome;

    response.already_answered = events.is_empty();
    for event in &events {
        state.analytics.emit_session_event(&experience, event);
    }
    if response.completed {
        state.sessions.remove(session_id);
    }

    Ok(Json(response))
}

/// POST /play/sessions/{session_id}/continue - Advance past the reveal.
///
/// The explicit continue gate: after the correctness of an answer has been
/// shown, moves the session to the next question. Forward only.
#[utoipa::path(
    post,
    path = "/play/sessions/{session_id}/continue",
    params(("session_id" = Uuid, Path, description = "Playthrough session id")),
    responses(
        (status = 200, description = "Advanced to the next question", body = ContinueResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Current question is unanswered or session is over")
    )
)]
pub async fn continue_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let next = state
        .sessions
        .with_session(session_id, |play| play.session.advance())
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Unknown session".to_string()))?
        .map_err(session_error)?;

    Ok(Json(ContinueResponse {
        current_question: next,
    }))
}

/// GET /play/sessions/{session_id} - Progress snapshot of a live session.
#[utoipa::path(
    get,
    path = "/play/sessions/{session_id}",
    params(("session_id" = Uuid, Path, description = "Playthrough session id")),
    responses(
        (status = 200, description = "Current progress", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn session_snapshot_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let snapshot = state
        .sessions
        .with_session(session_id, |play| {
            let phase = match play.session.phase() {
                QuizPhase::NotStarted => "not_started",
                QuizPhase::InProgress { .. } => "in_progress",
                QuizPhase::Completed => "completed",
            };
            SessionSnapshot {
                experience_id: play.session.experience_id(),
                phase: phase.to_string(),
                current_question: play.session.current_question_index(),
                answered: play
                    .session
                    .answers()
                    .iter()
                    .filter(|a| a.selected.is_some())
                    .count(),
                score: play.session.score(),
                total: play.session.total(),
            }
        })
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Unknown session".to_string()))?;

    Ok(Json(snapshot))
}
