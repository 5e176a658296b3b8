//! services/api/src/analytics.rs
//!
//! Fire-and-forget analytics emission. The play experience must never block
//! on telemetry delivery, so every event is recorded on a detached task and
//! failures are logged and swallowed. No retries.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;
use trivia_core::domain::{EventKind, NewAnalyticsEvent, TriviaExperience};
use trivia_core::ports::DatabaseService;
use trivia_core::session::SessionEvent;

#[derive(Clone)]
pub struct AnalyticsEmitter {
    db: Arc<dyn DatabaseService>,
}

impl AnalyticsEmitter {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Records one event in the background. Returns immediately.
    pub fn emit(&self, event: NewAnalyticsEvent) {
        let db = Arc::clone(&self.db);
        tokio::spawn(async move {
            let kind = event.event_type;
            if let Err(e) = db.record_analytics_event(event).await {
                warn!("failed to record {} analytics event: {e}", kind.as_str());
            }
        });
    }

    /// Translates a state-machine transition into its telemetry event and
    /// emits it against the experience the session is playing.
    pub fn emit_session_event(&self, experience: &TriviaExperience, event: &SessionEvent) {
        let new_event = match event {
            SessionEvent::Started => experience_event(experience, EventKind::Start, None, json!({})),
            SessionEvent::QuestionAnswered {
                question_index,
                selected,
                correct,
            } => experience_event(
                experience,
                EventKind::QuestionAnswer,
                Some(*question_index as u32),
                json!({ "selected": selected, "correct": correct }),
            ),
            SessionEvent::Completed { score, total } => experience_event(
                experience,
                EventKind::QuizComplete,
                None,
                json!({ "score": score, "total": total }),
            ),
        };
        self.emit(new_event);
    }
}

/// The `view` event recorded once per public fetch of an experience.
pub fn view_event(experience: &TriviaExperience) -> NewAnalyticsEvent {
    experience_event(experience, EventKind::View, None, json!({}))
}

fn experience_event(
    experience: &TriviaExperience,
    kind: EventKind,
    question_index: Option<u32>,
    metadata: serde_json::Value,
) -> NewAnalyticsEvent {
    NewAnalyticsEvent {
        experience_id: experience.id,
        project_id: experience.project_id,
        user_id: Some(experience.user_id),
        event_type: kind,
        question_index,
        metadata,
    }
}
