//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory store for live
//! quiz playthroughs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use trivia_core::domain::TriviaExperience;
use trivia_core::ports::{DatabaseService, TriviaGenerationService};
use trivia_core::session::QuizSession;
use uuid::Uuid;

use crate::analytics::AnalyticsEmitter;
use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all
/// handlers. Ports are trait objects so tests can substitute in-memory
/// implementations.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub trivia_generator: Arc<dyn TriviaGenerationService>,
    pub config: Arc<Config>,
    pub analytics: AnalyticsEmitter,
    pub sessions: SessionStore,
}

//=========================================================================================
// PlaySession and SessionStore
//=========================================================================================

/// One respondent's live playthrough: the state machine plus a snapshot of
/// the experience it is playing (needed to key analytics events).
pub struct PlaySession {
    pub session: QuizSession,
    pub experience: TriviaExperience,
}

impl PlaySession {
    pub fn new(experience: TriviaExperience) -> Self {
        let session = QuizSession::new(experience.id, experience.questions.clone());
        Self {
            session,
            experience,
        }
    }
}

/// In-memory map of live playthroughs. Sessions are transient: completed
/// sessions are removed when the final answer is returned, and a process
/// restart discards everything (restart-only, no resume).
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, PlaySession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new playthrough and returns its id.
    pub fn insert(&self, play: PlaySession) -> Uuid {
        let id = Uuid::new_v4();
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .insert(id, play);
        id
    }

    /// Runs `f` against the named session while holding the store lock.
    /// Returns `None` for an unknown session id. The closure must not block;
    /// no await happens while the lock is held.
    pub fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut PlaySession) -> T,
    ) -> Option<T> {
        let mut sessions = self.inner.lock().expect("session store lock poisoned");
        sessions.get_mut(&session_id).map(f)
    }

    /// Drops a finished or abandoned session.
    pub fn remove(&self, session_id: Uuid) {
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .remove(&session_id);
    }
}
