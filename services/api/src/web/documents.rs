//! services/api/src/web/documents.rs
//!
//! Document upload and document-to-trivia conversion. Upload extracts text
//! from the file and stores only the text; conversion feeds that text to the
//! generation port and creates an AI-generated trivia experience from the
//! result.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::extract::{extract_text, ExtractError};
use crate::web::{port_error, state::AppState};

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, Default, ToSchema)]
pub struct ConvertDocumentRequest {
    /// Project to attach the experience to; defaults to the document's.
    pub project_id: Option<Uuid>,
    /// Title for the experience; defaults to `Trivia from {file name}`.
    pub title: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /documents - Upload a document.
///
/// Accepts a multipart/form-data request with a `file` part and an optional
/// `project_id` part. The file's text is extracted according to its MIME
/// type and stored; the original bytes are discarded.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The document to upload."),
    responses(
        (status = 201, description = "Document stored"),
        (status = 400, description = "No file provided or the file is unreadable"),
        (status = 401, description = "Not signed in"),
        (status = 415, description = "Unsupported file type")
    )
)]
pub async fn upload_document_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut file: Option<(String, String, bytes::Bytes)> = None;
    let mut project_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {e}"),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("untitled.txt").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {e}"),
                    )
                })?;
                file = Some((file_name, mime_type, data));
            }
            "project_id" => {
                let raw = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read project_id field: {e}"),
                    )
                })?;
                let parsed = raw.parse::<Uuid>().map_err(|_| {
                    (
                        StatusCode::BAD_REQUEST,
                        "Invalid project_id format".to_string(),
                    )
                })?;
                project_id = Some(parsed);
            }
            _ => {}
        }
    }

    let (file_name, mime_type, data) = file.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        )
    })?;

    let text = extract_text(&mime_type, &data).map_err(|e| match e {
        ExtractError::UnsupportedFormat(_) => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
        }
        other => (StatusCode::BAD_REQUEST, other.to_string()),
    })?;

    let document = state
        .db
        .create_document(
            project_id,
            user_id,
            &file_name,
            &text,
            data.len() as i64,
            &mime_type,
        )
        .await
        .map_err(port_error)?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// POST /documents/{id}/trivia - Convert a document into a trivia experience.
///
/// One blocking upstream call per document; there is no retry, and an
/// unparseable model response fails the whole conversion without creating
/// anything.
#[utoipa::path(
    post,
    path = "/documents/{id}/trivia",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = ConvertDocumentRequest,
    responses(
        (status = 201, description = "Trivia experience created"),
        (status = 400, description = "Document is not attached to a project"),
        (status = 403, description = "Caller does not own the document"),
        (status = 404, description = "No such document"),
        (status = 502, description = "Conversion failed")
    )
)]
pub async fn convert_document_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(document_id): Path<Uuid>,
    Json(req): Json<ConvertDocumentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let document = state
        .db
        .get_document_by_id(document_id)
        .await
        .map_err(port_error)?;

    if document.user_id != user_id {
        return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
    }

    let project_id = req.project_id.or(document.project_id).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Document is not attached to a project and no project_id was given".to_string(),
        )
    })?;

    let questions = state
        .trivia_generator
        .generate_questions(&document.file_content)
        .await
        .map_err(|e| {
            error!("Conversion failed for document {document_id}: {e}");
            (
                StatusCode::BAD_GATEWAY,
                format!("Failed to convert document to trivia: {e}"),
            )
        })?;

    let title = req
        .title
        .unwrap_or_else(|| format!("Trivia from {}", document.file_name));

    let trivia = state
        .db
        .create_trivia_experience(project_id, document.user_id, &title, &questions, true)
        .await
        .map_err(port_error)?;

    Ok((StatusCode::CREATED, Json(trivia)))
}
