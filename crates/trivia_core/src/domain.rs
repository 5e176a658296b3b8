//! crates/trivia_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; the serde
//! derives exist because question sets and analytics metadata are a JSON
//! shape both on the wire and in storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question.
///
/// Invariant: `options` has exactly [`OPTION_COUNT`] entries and
/// `correct_answer` indexes into it. The conversion parser and the editor
/// both enforce this before a question reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl TriviaQuestion {
    /// An empty question as the editor's "Add Question" produces it.
    pub fn blank() -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(); OPTION_COUNT],
            correct_answer: 0,
        }
    }

    /// Whether the question satisfies the option-count and index invariants.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == OPTION_COUNT && self.correct_answer < OPTION_COUNT
    }
}

/// A named, ordered question set tied to one owner and one project.
///
/// Becomes publicly playable once `share_slug` is set; there is no
/// un-publish transition.
#[derive(Debug, Clone, Serialize)]
pub struct TriviaExperience {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub questions: Vec<TriviaQuestion>,
    pub ai_generated: bool,
    pub share_slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A client engagement that documents and trivia experiences hang off.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An uploaded document, stored as its extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_content: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The kinds of telemetry events the play flow emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    View,
    Start,
    QuestionAnswer,
    QuizComplete,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Start => "start",
            EventKind::QuestionAnswer => "question_answer",
            EventKind::QuizComplete => "quiz_complete",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(EventKind::View),
            "start" => Ok(EventKind::Start),
            "question_answer" => Ok(EventKind::QuestionAnswer),
            "quiz_complete" => Ok(EventKind::QuizComplete),
            other => Err(format!("unknown event type '{other}'")),
        }
    }
}

/// A recorded analytics event. Append-only: never mutated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub experience_id: Uuid,
    pub project_id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: EventKind,
    pub question_index: Option<u32>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An analytics event before it has been assigned an id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAnalyticsEvent {
    pub experience_id: Uuid,
    pub project_id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: EventKind,
    pub question_index: Option<u32>,
    pub metadata: serde_json::Value,
}

// Represents a user - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
