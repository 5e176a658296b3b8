//! crates/trivia_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or model APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::convert::ConversionError;
use crate::domain::{
    AnalyticsEvent, AuthSession, Document, NewAnalyticsEvent, Project, TriviaExperience,
    TriviaQuestion, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Partial-Update Payloads
//=========================================================================================

/// Fields for the editor's `save()` operation. Whichever fields are present
/// overwrite the stored value entirely; absent fields are left untouched
/// (last write wins, no merge).
#[derive(Debug, Clone, Default)]
pub struct TriviaUpdate {
    pub title: Option<String>,
    pub questions: Option<Vec<TriviaQuestion>>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Project Management ---
    async fn create_project(
        &self,
        user_id: Uuid,
        business_name: &str,
        contact_email: &str,
    ) -> PortResult<Project>;

    async fn get_project_by_id(&self, project_id: Uuid) -> PortResult<Project>;

    async fn list_projects_for_user(&self, user_id: Uuid) -> PortResult<Vec<Project>>;

    // --- Document Management ---
    async fn create_document(
        &self,
        project_id: Option<Uuid>,
        user_id: Uuid,
        file_name: &str,
        file_content: &str,
        file_size: i64,
        mime_type: &str,
    ) -> PortResult<Document>;

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document>;

    async fn list_documents_for_project(&self, project_id: Uuid) -> PortResult<Vec<Document>>;

    // --- Trivia Experiences ---
    async fn create_trivia_experience(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        title: &str,
        questions: &[TriviaQuestion],
        ai_generated: bool,
    ) -> PortResult<TriviaExperience>;

    async fn get_trivia_by_id(&self, trivia_id: Uuid) -> PortResult<TriviaExperience>;

    /// Resolves a published experience by its share slug. Unpublished
    /// experiences are not reachable this way.
    async fn get_trivia_by_slug(&self, slug: &str) -> PortResult<TriviaExperience>;

    async fn list_trivia_for_project(&self, project_id: Uuid)
        -> PortResult<Vec<TriviaExperience>>;

    /// Applies a partial update and stamps `updated_at`.
    async fn update_trivia_experience(
        &self,
        trivia_id: Uuid,
        update: TriviaUpdate,
    ) -> PortResult<TriviaExperience>;

    /// Sets the share slug to the experience's own id when unset and always
    /// refreshes `updated_at`. Idempotent.
    async fn publish_trivia(&self, trivia_id: Uuid) -> PortResult<TriviaExperience>;

    // --- Analytics ---
    async fn record_analytics_event(
        &self,
        event: NewAnalyticsEvent,
    ) -> PortResult<AnalyticsEvent>;

    async fn list_events_for_experience(
        &self,
        experience_id: Uuid,
    ) -> PortResult<Vec<AnalyticsEvent>>;

    async fn list_events_for_project(&self, project_id: Uuid)
        -> PortResult<Vec<AnalyticsEvent>>;
}

#[async_trait]
pub trait TriviaGenerationService: Send + Sync {
    /// Converts raw extracted document text into a validated question set.
    ///
    /// A single at-most-once upstream call: no timeout or retry policy is
    /// applied here, and failure must surface to the initiating user.
    async fn generate_questions(
        &self,
        document_text: &str,
    ) -> Result<Vec<TriviaQuestion>, ConversionError>;
}
