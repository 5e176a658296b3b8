//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `DatabaseService` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use trivia_core::domain::{
    AnalyticsEvent, AuthSession, Document, NewAnalyticsEvent, Project, TriviaExperience,
    TriviaQuestion, User, UserCredentials,
};
use trivia_core::ports::{DatabaseService, PortError, PortResult, TriviaUpdate};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(entity: &str, id: impl std::fmt::Display) -> impl FnOnce(sqlx::Error) -> PortError {
    let message = format!("{entity} {id} not found");
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(message),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct ProjectRecord {
    id: Uuid,
    user_id: Uuid,
    business_name: String,
    contact_email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl ProjectRecord {
    fn to_domain(self) -> Project {
        Project {
            id: self.id,
            user_id: self.user_id,
            business_name: self.business_name,
            contact_email: self.contact_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    project_id: Option<Uuid>,
    user_id: Uuid,
    file_name: String,
    file_content: String,
    file_size: i64,
    mime_type: String,
    uploaded_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            project_id: self.project_id,
            user_id: self.user_id,
            file_name: self.file_name,
            file_content: self.file_content,
            file_size: self.file_size,
            mime_type: self.mime_type,
            uploaded_at: self.uploaded_at,
        }
    }
}

#[derive(FromRow)]
struct TriviaRecord {
    id: Uuid,
    project_id: Uuid,
    user_id: Uuid,
    title: String,
    questions: serde_json::Value,
    ai_generated: bool,
    share_slug: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl TriviaRecord {
    /// The questions column is JSONB; a row that fails to decode is treated
    /// as a storage-layer failure rather than silently dropped.
    fn to_domain(self) -> PortResult<TriviaExperience> {
        let questions: Vec<TriviaQuestion> = serde_json::from_value(self.questions)
            .map_err(|e| PortError::Unexpected(format!("corrupt question set: {e}")))?;
        Ok(TriviaExperience {
            id: self.id,
            project_id: self.project_id,
            user_id: self.user_id,
            title: self.title,
            questions,
            ai_generated: self.ai_generated,
            share_slug: self.share_slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct EventRecord {
    id: Uuid,
    experience_id: Uuid,
    project_id: Uuid,
    user_id: Option<Uuid>,
    event_type: String,
    question_index: Option<i32>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}
impl EventRecord {
    fn to_domain(self) -> PortResult<AnalyticsEvent> {
        let event_type = self
            .event_type
            .parse()
            .map_err(|e: String| PortError::Unexpected(e))?;
        Ok(AnalyticsEvent {
            id: self.id,
            experience_id: self.experience_id,
            project_id: self.project_id,
            user_id: self.user_id,
            event_type,
            question_index: self.question_index.map(|i| i as u32),
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

const TRIVIA_COLUMNS: &str =
    "id, project_id, user_id, title, questions, ai_generated, share_slug, created_at, updated_at";
const EVENT_COLUMNS: &str =
    "id, experience_id, project_id, user_id, event_type, question_index, metadata, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password)
             VALUES ($1, $2, $3)
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("user", email))?;

        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "INSERT INTO auth_sessions (id, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, expires_at",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            other => PortError::Unexpected(other.to_string()),
        })?;

        if record.expires_at < Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(record.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_project(
        &self,
        user_id: Uuid,
        business_name: &str,
        contact_email: &str,
    ) -> PortResult<Project> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            "INSERT INTO projects (id, user_id, business_name, contact_email)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, business_name, contact_email, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(business_name)
        .bind(contact_email)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_project_by_id(&self, project_id: Uuid) -> PortResult<Project> {
        let record = sqlx::query_as::<_, ProjectRecord>(
            "SELECT id, user_id, business_name, contact_email, created_at, updated_at
             FROM projects WHERE id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("project", project_id))?;

        Ok(record.to_domain())
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> PortResult<Vec<Project>> {
        let records = sqlx::query_as::<_, ProjectRecord>(
            "SELECT id, user_id, business_name, contact_email, created_at, updated_at
             FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(ProjectRecord::to_domain).collect())
    }

    async fn create_document(
        &self,
        project_id: Option<Uuid>,
        user_id: Uuid,
        file_name: &str,
        file_content: &str,
        file_size: i64,
        mime_type: &str,
    ) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (id, project_id, user_id, file_name, file_content, file_size, mime_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, project_id, user_id, file_name, file_content, file_size, mime_type, uploaded_at",
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(user_id)
        .bind(file_name)
        .bind(file_content)
        .bind(file_size)
        .bind(mime_type)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, project_id, user_id, file_name, file_content, file_size, mime_type, uploaded_at
             FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("document", document_id))?;

        Ok(record.to_domain())
    }

    async fn list_documents_for_project(&self, project_id: Uuid) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, project_id, user_id, file_name, file_content, file_size, mime_type, uploaded_at
             FROM documents WHERE project_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(DocumentRecord::to_domain).collect())
    }

    async fn create_trivia_experience(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        title: &str,
        questions: &[TriviaQuestion],
        ai_generated: bool,
    ) -> PortResult<TriviaExperience> {
        let questions_json = serde_json::to_value(questions)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, TriviaRecord>(&format!(
            "INSERT INTO trivia_experiences (id, project_id, user_id, title, questions, ai_generated)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TRIVIA_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(user_id)
        .bind(title)
        .bind(questions_json)
        .bind(ai_generated)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn get_trivia_by_id(&self, trivia_id: Uuid) -> PortResult<TriviaExperience> {
        let record = sqlx::query_as::<_, TriviaRecord>(&format!(
            "SELECT {TRIVIA_COLUMNS} FROM trivia_experiences WHERE id = $1"
        ))
        .bind(trivia_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("trivia experience", trivia_id))?;

        record.to_domain()
    }

    async fn get_trivia_by_slug(&self, slug: &str) -> PortResult<TriviaExperience> {
        let record = sqlx::query_as::<_, TriviaRecord>(&format!(
            "SELECT {TRIVIA_COLUMNS} FROM trivia_experiences WHERE share_slug = $1"
        ))
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("shared trivia experience", slug))?;

        record.to_domain()
    }

    async fn list_trivia_for_project(
        &self,
        project_id: Uuid,
    ) -> PortResult<Vec<TriviaExperience>> {
        let records = sqlx::query_as::<_, TriviaRecord>(&format!(
            "SELECT {TRIVIA_COLUMNS} FROM trivia_experiences
             WHERE project_id = $1 ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(TriviaRecord::to_domain).collect()
    }

    async fn update_trivia_experience(
        &self,
        trivia_id: Uuid,
        update: TriviaUpdate,
    ) -> PortResult<TriviaExperience> {
        let questions_json = match &update.questions {
            Some(questions) => Some(
                serde_json::to_value(questions)
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            None => None,
        };

        // Absent fields keep their stored value; present fields overwrite it
        // entirely (last write wins, no merge).
        let record = sqlx::query_as::<_, TriviaRecord>(&format!(
            "UPDATE trivia_experiences
             SET title = COALESCE($2, title),
                 questions = COALESCE($3, questions),
                 updated_at = now()
             WHERE id = $1
             RETURNING {TRIVIA_COLUMNS}"
        ))
        .bind(trivia_id)
        .bind(update.title)
        .bind(questions_json)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("trivia experience", trivia_id))?;

        record.to_domain()
    }

    async fn publish_trivia(&self, trivia_id: Uuid) -> PortResult<TriviaExperience> {
        // The slug is the experience's own id; publishing twice only
        // refreshes updated_at.
        let record = sqlx::query_as::<_, TriviaRecord>(&format!(
            "UPDATE trivia_experiences
             SET share_slug = COALESCE(share_slug, id::text),
                 updated_at = now()
             WHERE id = $1
             RETURNING {TRIVIA_COLUMNS}"
        ))
        .bind(trivia_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("trivia experience", trivia_id))?;

        record.to_domain()
    }

    async fn record_analytics_event(
        &self,
        event: NewAnalyticsEvent,
    ) -> PortResult<AnalyticsEvent> {
        let record = sqlx::query_as::<_, EventRecord>(&format!(
            "INSERT INTO analytics_events
                 (id, experience_id, project_id, user_id, event_type, question_index, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(event.experience_id)
        .bind(event.project_id)
        .bind(event.user_id)
        .bind(event.event_type.as_str())
        .bind(event.question_index.map(|i| i as i32))
        .bind(event.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn list_events_for_experience(
        &self,
        experience_id: Uuid,
    ) -> PortResult<Vec<AnalyticsEvent>> {
        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM analytics_events
             WHERE experience_id = $1 ORDER BY created_at DESC"
        ))
        .bind(experience_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(EventRecord::to_domain).collect()
    }

    async fn list_events_for_project(
        &self,
        project_id: Uuid,
    ) -> PortResult<Vec<AnalyticsEvent>> {
        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM analytics_events
             WHERE project_id = $1 ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(EventRecord::to_domain).collect()
    }
}
