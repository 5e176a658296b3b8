pub mod convert;
pub mod domain;
pub mod editor;
pub mod ports;
pub mod session;

pub use convert::{parse_question_set, ConversionError};
pub use domain::{
    AnalyticsEvent, AuthSession, Document, EventKind, NewAnalyticsEvent, Project,
    TriviaExperience, TriviaQuestion, User, UserCredentials, OPTION_COUNT,
};
pub use editor::{validate_questions, EditError, TriviaDraft};
pub use ports::{DatabaseService, PortError, PortResult, TriviaGenerationService, TriviaUpdate};
pub use session::{AnswerRecord, QuizPhase, QuizSession, SessionError, SessionEvent, REVEAL_MILLIS};
