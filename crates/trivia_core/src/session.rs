//! crates/trivia_core/src/session.rs
//!
//! The quiz playthrough state machine. One respondent drives one session
//! through `NotStarted -> InProgress(i) -> Completed`; there are no back
//! transitions, no pause, and no persistence. An abandoned session is simply
//! dropped and a new playthrough starts from scratch.
//!
//! Answering does not immediately move to the next question: the respondent
//! is shown the correctness of the answer they just gave for a fixed interval
//! ([`REVEAL_MILLIS`]) before advancing, so the machine holds on the answered
//! question until [`QuizSession::advance`] is called (the explicit continue
//! gate). Answering the last question completes the session immediately.
//! Duplicate submissions during the reveal window hit the already-answered
//! question and are no-ops: the first answer wins and nothing is re-emitted.
//!
//! Transitions return [`SessionEvent`]s as plain data. The caller decides
//! what to do with them (the web layer forwards them to the analytics
//! emitter), which keeps this module free of I/O.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{TriviaQuestion, OPTION_COUNT};

/// How long the respondent sees the correctness of an answer before the quiz
/// advances. A UX contract, not a correctness requirement.
pub const REVEAL_MILLIS: u64 = 1000;

/// Where a playthrough currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    InProgress { current: usize },
    Completed,
}

/// The recorded answer for one question. Both fields stay `None` until the
/// respondent answers; the first answer wins and is never overwritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerRecord {
    pub selected: Option<usize>,
    pub correct: Option<bool>,
}

/// Telemetry-worthy outcomes of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    QuestionAnswered {
        question_index: usize,
        selected: usize,
        correct: bool,
    },
    Completed {
        score: usize,
        total: usize,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot start a quiz with no questions")]
    EmptyQuestionSet,
    #[error("the quiz has already been started")]
    AlreadyStarted,
    #[error("no question is currently awaiting an answer")]
    NotInProgress,
    #[error("option index {0} is out of range")]
    OptionOutOfRange(usize),
    #[error("the current question has not been answered yet")]
    AdvanceBeforeAnswer,
}

/// One respondent's transient progress through an experience's questions.
#[derive(Debug, Clone)]
pub struct QuizSession {
    experience_id: Uuid,
    questions: Vec<TriviaQuestion>,
    phase: QuizPhase,
    answers: Vec<AnswerRecord>,
    started_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Creates a session over a snapshot of the experience's questions,
    /// with every question initialized to "unanswered".
    pub fn new(experience_id: Uuid, questions: Vec<TriviaQuestion>) -> Self {
        let answers = vec![AnswerRecord::default(); questions.len()];
        Self {
            experience_id,
            questions,
            phase: QuizPhase::NotStarted,
            answers,
            started_at: None,
        }
    }

    pub fn experience_id(&self) -> Uuid {
        self.experience_id
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn questions(&self) -> &[TriviaQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    /// The index of the question currently shown, while in progress.
    pub fn current_question_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::InProgress { current } => Some(current),
            _ => None,
        }
    }

    /// Count of correctly answered questions. Unanswered counts as incorrect.
    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.correct == Some(true))
            .count()
    }

    /// `round(score / total * 100)`, or 0 for an empty question set.
    pub fn completion_percent(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.score() as f64 / self.questions.len() as f64) * 100.0).round() as u32
    }

    /// `NotStarted -> InProgress(0)`. Rejected for an empty question set and
    /// for a session that has already left `NotStarted`.
    pub fn start(&mut self) -> Result<SessionEvent, SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }
        if self.phase != QuizPhase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.phase = QuizPhase::InProgress { current: 0 };
        self.started_at = Some(Utc::now());
        Ok(SessionEvent::Started)
    }

    /// Records the answer for the current question.
    ///
    /// Idempotent against double submission: if the current question already
    /// has a recorded answer, nothing changes and no events are returned, so
    /// duplicate UI events cannot double-count. Otherwise the answer is
    /// recorded and a `QuestionAnswered` event is returned. Answering the
    /// last question transitions to `Completed` and additionally returns
    /// `Completed { score, total }`; any earlier question leaves the machine
    /// on the same index until [`Self::advance`].
    pub fn select_answer(
        &mut self,
        option_index: usize,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        let current = match self.phase {
            QuizPhase::InProgress { current } => current,
            _ => return Err(SessionError::NotInProgress),
        };
        if option_index >= OPTION_COUNT {
            return Err(SessionError::OptionOutOfRange(option_index));
        }
        if self.answers[current].selected.is_some() {
            return Ok(Vec::new());
        }

        let correct = option_index == self.questions[current].correct_answer;
        self.answers[current] = AnswerRecord {
            selected: Some(option_index),
            correct: Some(correct),
        };

        let mut events = vec![SessionEvent::QuestionAnswered {
            question_index: current,
            selected: option_index,
            correct,
        }];

        if current + 1 == self.questions.len() {
            self.phase = QuizPhase::Completed;
            events.push(SessionEvent::Completed {
                score: self.score(),
                total: self.questions.len(),
            });
        }

        Ok(events)
    }

    /// `InProgress(i) -> InProgress(i+1)`, once question `i` is answered.
    ///
    /// The current index only moves forward, never back. Returns the new
    /// index. The last question never advances; answering it completes the
    /// session instead.
    pub fn advance(&mut self) -> Result<usize, SessionError> {
        let current = match self.phase {
            QuizPhase::InProgress { current } => current,
            _ => return Err(SessionError::NotInProgress),
        };
        if self.answers[current].selected.is_none() {
            return Err(SessionError::AdvanceBeforeAnswer);
        }
        let next = current + 1;
        debug_assert!(next < self.questions.len());
        self.phase = QuizPhase::InProgress { current: next };
        Ok(next)
    }
}
