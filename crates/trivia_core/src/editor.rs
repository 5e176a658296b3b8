//! crates/trivia_core/src/editor.rs
//!
//! The in-memory working copy an owner edits before explicitly saving.
//! Nothing here touches storage: the draft accumulates changes and the web
//! layer persists title and questions as one atomic unit through
//! `DatabaseService::update_trivia_experience`. There is no autosave and no
//! merge; whatever is saved overwrites the stored value entirely.

use crate::domain::{TriviaExperience, TriviaQuestion, OPTION_COUNT};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    #[error("question index {index} is out of range (question count is {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("question {index} is malformed: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

/// A mutable copy of an experience's title and question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaDraft {
    pub title: String,
    pub questions: Vec<TriviaQuestion>,
}

impl TriviaDraft {
    pub fn new(title: impl Into<String>, questions: Vec<TriviaQuestion>) -> Self {
        Self {
            title: title.into(),
            questions,
        }
    }

    pub fn from_experience(experience: &TriviaExperience) -> Self {
        Self::new(experience.title.clone(), experience.questions.clone())
    }

    /// Appends a question with empty text, four empty option slots, and the
    /// first option marked correct.
    pub fn add_question(&mut self) {
        self.questions.push(TriviaQuestion::blank());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn update_question_text(&mut self, index: usize, text: &str) -> Result<(), EditError> {
        let question = self.question_mut(index)?;
        question.question = text.to_owned();
        Ok(())
    }

    pub fn update_option(
        &mut self,
        index: usize,
        option_index: usize,
        text: &str,
    ) -> Result<(), EditError> {
        if option_index >= OPTION_COUNT {
            return Err(EditError::OutOfRange {
                index: option_index,
                len: OPTION_COUNT,
            });
        }
        let question = self.question_mut(index)?;
        question.options[option_index] = text.to_owned();
        Ok(())
    }

    /// Marks which of the four options is correct. Option text and
    /// correctness are independently editable; an empty option may be the
    /// correct one.
    pub fn set_correct_option(
        &mut self,
        index: usize,
        option_index: usize,
    ) -> Result<(), EditError> {
        if option_index >= OPTION_COUNT {
            return Err(EditError::OutOfRange {
                index: option_index,
                len: OPTION_COUNT,
            });
        }
        let question = self.question_mut(index)?;
        question.correct_answer = option_index;
        Ok(())
    }

    /// Removes the question at `index`, shifting subsequent questions down.
    pub fn delete_question(&mut self, index: usize) -> Result<TriviaQuestion, EditError> {
        if index >= self.questions.len() {
            return Err(EditError::OutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        Ok(self.questions.remove(index))
    }

    /// Checks every question against the option-count and index invariants.
    pub fn validate(&self) -> Result<(), EditError> {
        validate_questions(&self.questions)
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut TriviaQuestion, EditError> {
        let len = self.questions.len();
        self.questions
            .get_mut(index)
            .ok_or(EditError::OutOfRange { index, len })
    }
}

/// Rejects any question that does not carry exactly four options or whose
/// correct index does not point at one of them.
pub fn validate_questions(questions: &[TriviaQuestion]) -> Result<(), EditError> {
    for (index, question) in questions.iter().enumerate() {
        if question.options.len() != OPTION_COUNT {
            return Err(EditError::InvalidQuestion {
                index,
                reason: format!(
                    "expected {OPTION_COUNT} options, got {}",
                    question.options.len()
                ),
            });
        }
        if question.correct_answer >= OPTION_COUNT {
            return Err(EditError::InvalidQuestion {
                index,
                reason: format!("correct answer index {} is out of range", question.correct_answer),
            });
        }
    }
    Ok(())
}
