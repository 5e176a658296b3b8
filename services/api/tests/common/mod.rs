//! Shared fixtures for the integration tests: an in-memory implementation of
//! the `DatabaseService` port, a canned model for the generation port, and
//! helpers for driving the router with `tower::ServiceExt`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_lib::analytics::AnalyticsEmitter;
use api_lib::config::Config;
use api_lib::web::state::{AppState, SessionStore};
use api_lib::web::router;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tower::ServiceExt;
use trivia_core::convert::{parse_question_set, ConversionError};
use trivia_core::domain::{
    AnalyticsEvent, AuthSession, Document, NewAnalyticsEvent, Project, TriviaExperience,
    TriviaQuestion, User, UserCredentials,
};
use trivia_core::ports::{
    DatabaseService, PortError, PortResult, TriviaGenerationService, TriviaUpdate,
};
use uuid::Uuid;

//=========================================================================================
// In-memory DatabaseService
//=========================================================================================

#[derive(Default)]
struct Inner {
    users: Vec<UserCredentials>,
    auth_sessions: HashMap<String, AuthSession>,
    projects: HashMap<Uuid, Project>,
    documents: HashMap<Uuid, Document>,
    trivia: HashMap<Uuid, TriviaExperience>,
    events: Vec<AnalyticsEvent>,
}

#[derive(Default)]
pub struct InMemoryDb {
    inner: Mutex<Inner>,
}

impl InMemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(PortError::Unexpected("email already registered".into()));
        }
        let credentials = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        inner.users.push(credentials.clone());
        Ok(User {
            user_id: credentials.user_id,
            email: credentials.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("user {email} not found")))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession> {
        let session = AuthSession {
            id: session_id.to_string(),
            user_id,
            expires_at,
        };
        self.inner
            .lock()
            .unwrap()
            .auth_sessions
            .insert(session_id.to_string(), session.clone());
        Ok(session)
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let inner = self.inner.lock().unwrap();
        let session = inner
            .auth_sessions
            .get(session_id)
            .ok_or(PortError::Unauthorized)?;
        if session.expires_at < Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(session.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.inner.lock().unwrap().auth_sessions.remove(session_id);
        Ok(())
    }

    async fn create_project(
        &self,
        user_id: Uuid,
        business_name: &str,
        contact_email: &str,
    ) -> PortResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id,
            business_name: business_name.to_string(),
            contact_email: contact_email.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project_by_id(&self, project_id: Uuid) -> PortResult<Project> {
        self.inner
            .lock()
            .unwrap()
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("project {project_id} not found")))
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> PortResult<Vec<Project>> {
        let inner = self.inner.lock().unwrap();
        let mut projects: Vec<_> = inner
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        Ok(projects)
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
        let document = Document {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            file_name: file_name.to_string(),
            file_content: file_content.to_string(),
            file_size,
            mime_type: mime_type.to_string(),
            uploaded_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .documents
            .insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .get(&document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("document {document_id} not found")))
    }

    async fn list_documents_for_project(&self, project_id: Uuid) -> PortResult<Vec<Document>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .documents
            .values()
            .filter(|d| d.project_id == Some(project_id))
            .cloned()
            .collect())
    }

    async fn create_trivia_experience(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        title: &str,
        questions: &[TriviaQuestion],
        ai_generated: bool,
    ) -> PortResult<TriviaExperience> {
        let now = Utc::now();
        let trivia = TriviaExperience {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            title: title.to_string(),
            questions: questions.to_vec(),
            ai_generated,
            share_slug: None,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .trivia
            .insert(trivia.id, trivia.clone());
        Ok(trivia)
    }

    async fn get_trivia_by_id(&self, trivia_id: Uuid) -> PortResult<TriviaExperience> {
        self.inner
            .lock()
            .unwrap()
            .trivia
            .get(&trivia_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("trivia experience {trivia_id} not found")))
    }

    async fn get_trivia_by_slug(&self, slug: &str) -> PortResult<TriviaExperience> {
        self.inner
            .lock()
            .unwrap()
            .trivia
            .values()
            .find(|t| t.share_slug.as_deref() == Some(slug))
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("shared trivia experience {slug} not found")))
    }

    async fn list_trivia_for_project(
        &self,
        project_id: Uuid,
    ) -> PortResult<Vec<TriviaExperience>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .trivia
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update_trivia_experience(
        &self,
        trivia_id: Uuid,
        update: TriviaUpdate,
    ) -> PortResult<TriviaExperience> {
        let mut inner = self.inner.lock().unwrap();
        let trivia = inner
            .trivia
            .get_mut(&trivia_id)
            .ok_or_else(|| PortError::NotFound(format!("trivia experience {trivia_id} not found")))?;
        if let Some(title) = update.title {
            trivia.title = title;
        }
        if let Some(questions) = update.questions {
            trivia.questions = questions;
        }
        trivia.updated_at = Utc::now();
        Ok(trivia.clone())
    }

    async fn publish_trivia(&self, trivia_id: Uuid) -> PortResult<TriviaExperience> {
        let mut inner = self.inner.lock().unwrap();
        let trivia = inner
            .trivia
            .get_mut(&trivia_id)
            .ok_or_else(|| PortError::NotFound(format!("trivia experience {trivia_id} not found")))?;
        if trivia.share_slug.is_none() {
            trivia.share_slug = Some(trivia.id.to_string());
        }
        trivia.updated_at = Utc::now();
        Ok(trivia.clone())
    }

    async fn record_analytics_event(
        &self,
        event: NewAnalyticsEvent,
    ) -> PortResult<AnalyticsEvent> {
        let recorded = AnalyticsEvent {
            id: Uuid::new_v4(),
            experience_id: event.experience_id,
            project_id: event.project_id,
            user_id: event.user_id,
            event_type: event.event_type,
            question_index: event.question_index,
            metadata: event.metadata,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().events.push(recorded.clone());
        Ok(recorded)
    }

    async fn list_events_for_experience(
        &self,
        experience_id: Uuid,
    ) -> PortResult<Vec<AnalyticsEvent>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .events
            .iter()
            .filter(|e| e.experience_id == experience_id)
            .cloned()
            .collect())
    }

    async fn list_events_for_project(
        &self,
        project_id: Uuid,
    ) -> PortResult<Vec<AnalyticsEvent>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .events
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Canned model
//=========================================================================================

/// A generation port that always "responds" with the configured text, run
/// through the same parse-and-validate step the real adapter uses.
pub struct CannedModel {
    pub raw_response: String,
}

#[async_trait]
impl TriviaGenerationService for CannedModel {
    async fn generate_questions(
        &self,
        _document_text: &str,
    ) -> Result<Vec<TriviaQuestion>, ConversionError> {
        parse_question_set(&self.raw_response)
    }
}

//=========================================================================================
// Fixture helpers
//=========================================================================================

pub struct TestApp {
    pub db: Arc<InMemoryDb>,
    pub state: AppState,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        trivia_model: "canned".to_string(),
        public_base_url: "http://localhost:3000".to_string(),
    }
}

/// Builds an app over the in-memory database and a canned model response.
pub fn test_app(raw_model_response: &str) -> TestApp {
    let db = InMemoryDb::new();
    let db_port: Arc<dyn DatabaseService> = db.clone();
    let state = AppState {
        db: db_port.clone(),
        trivia_generator: Arc::new(CannedModel {
            raw_response: raw_model_response.to_string(),
        }),
        config: Arc::new(test_config()),
        analytics: AnalyticsEmitter::new(db_port),
        sessions: SessionStore::new(),
    };
    TestApp { db, state }
}

impl TestApp {
    pub fn router(&self) -> axum::Router {
        router(self.state.clone())
    }

    /// Seeds a user directly and returns `(user_id, cookie header value)`.
    pub async fn seed_user(&self, email: &str) -> (Uuid, String) {
        let user = self
            .db
            .create_user_with_email(email, "fixture-hash")
            .await
            .expect("seed user");
        let token = format!("token-{}", user.user_id);
        self.db
            .create_auth_session(&token, user.user_id, Utc::now() + ChronoDuration::days(1))
            .await
            .expect("seed auth session");
        (user.user_id, format!("session={token}"))
    }

    /// Waits until the experience has at least `expected` recorded events;
    /// emission is fire-and-forget, so tests must not race it.
    pub async fn wait_for_events(
        &self,
        experience_id: Uuid,
        expected: usize,
    ) -> Vec<AnalyticsEvent> {
        for _ in 0..100 {
            let events = self
                .db
                .list_events_for_experience(experience_id)
                .await
                .expect("list events");
            if events.len() >= expected {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {expected} analytics events");
    }
}

//=========================================================================================
// Request helpers
//=========================================================================================

pub async fn send_json(
    app: &axum::Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request build should succeed");

    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
