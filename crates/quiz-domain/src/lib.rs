//! Core domain types shared across the adaptive quiz engine's services.

pub mod errors;
mod grade;
pub mod ids;
mod progress;
mod question;
mod session;
mod wrong_entry;

/// Entity decode and validation error types.
pub use errors::{DecodeError, ValidationError};
/// Exact-set answer grading.
pub use grade::{grade_answer, AnswerGrade, GradeError};
/// Opaque identifiers for questions, choices, users, and sessions.
pub use ids::{ChoiceId, QuestionId, SessionId, UserId};
/// Per-user, per-question attempt history and target-difficulty tracking.
pub use progress::{Progress, UserDifficulty};
/// Immutable question content and the choices presented alongside it.
pub use question::{Choice, DeclaredDifficulty, Question, QuestionKind, QuestionStatus};
/// A user's attempt at a fixed question pool, and its lifecycle states.
pub use session::{
    InvalidTransition, Session, SessionConfig, SessionProgress, SessionSource, SessionStatus,
};
/// Wrong-pool entries tracking questions awaiting mastery re-presentation.
pub use wrong_entry::{Attempt, WrongEntry};
