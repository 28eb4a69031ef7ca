//! Unified error type returned by every public `quiz-core` operation.

use thiserror::Error;

use quiz_domain::{DecodeError, GradeError, ValidationError};
use quiz_scheduler::SchedulerError;
use store_adapter::StoreError;

/// Closed error taxonomy surfaced by [`crate::engine::QuizEngine`], carrying
/// a stable lowercase code (the `#[error]` message's leading word) a caller
/// can match on without downcasting.
#[derive(Debug, Error)]
pub enum QuizError {
    /// `create_session` rejected a malformed or oversized request.
    #[error("invalid_session_config: {reason}")]
    InvalidSessionConfig { reason: String },
    /// A submitted answer failed grading-input validation (e.g. empty selection).
    #[error("invalid_answer: {0}")]
    InvalidAnswer(#[from] GradeError),
    /// A status transition was attempted that the allowed-transitions table forbids.
    #[error("invalid_transition: cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    /// The requested session does not exist, or exists under a different user.
    #[error("session_not_found: session {session_id} not found for user {user_id}")]
    SessionNotFound { session_id: String, user_id: String },
    /// A question referenced by a session's pool or a wrong-pool entry is missing from the catalog.
    #[error("question_not_found: {question_id}")]
    QuestionNotFound { question_id: String },
    /// Optimistic-concurrency retries were exhausted on an atomic advance.
    #[error("concurrent: session advance conflicted {attempts} time(s) in a row")]
    Concurrent { attempts: u8 },
    /// The session's current status cannot currently serve questions.
    #[error("session_not_serving: session {session_id} is not currently serving")]
    SessionNotServing { session_id: String },
    /// Requested more questions than the catalog could supply at creation time.
    #[error("insufficient_questions: requested {requested}, catalog had {available}")]
    InsufficientQuestions { requested: u32, available: u32 },
    /// Transient-error retries inside the Store Adapter were exhausted.
    #[error("storage_unavailable: {attempts} attempt(s)")]
    StorageUnavailable { attempts: u8 },
    /// A persisted record failed to decode.
    #[error("corrupted: {field_path}")]
    Corrupted { field_path: String },
    /// The operation's deadline elapsed before it could complete.
    #[error("timeout: {operation}")]
    Timeout { operation: &'static str },
}

impl From<DecodeError> for QuizError {
    fn from(err: DecodeError) -> Self {
        QuizError::Corrupted {
            field_path: err.to_string(),
        }
    }
}

impl From<ValidationError> for QuizError {
    fn from(err: ValidationError) -> Self {
        QuizError::Corrupted {
            field_path: err.to_string(),
        }
    }
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key } => QuizError::Corrupted { field_path: key },
            StoreError::Conflict { table, reason } => QuizError::Corrupted {
                field_path: format!("{table}: {reason}"),
            },
            StoreError::StorageUnavailable { attempts } => QuizError::StorageUnavailable { attempts },
            StoreError::Corrupted { field_path } => QuizError::Corrupted { field_path },
            StoreError::PoisonedLock { resource } => QuizError::Corrupted {
                field_path: resource.to_string(),
            },
        }
    }
}

impl From<SchedulerError> for QuizError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Store(store_error) => store_error.into(),
            SchedulerError::InvalidSessionConfig { reason } => QuizError::InvalidSessionConfig { reason },
            SchedulerError::InvalidTransition { from, to } => QuizError::InvalidTransition { from, to },
            SchedulerError::InsufficientQuestions { requested, available } => {
                QuizError::InsufficientQuestions { requested, available }
            }
            SchedulerError::Concurrent { attempts } => QuizError::Concurrent { attempts },
            SchedulerError::SessionNotFound { session_id, user_id } => {
                QuizError::SessionNotFound { session_id, user_id }
            }
        }
    }
}

/// Convenience alias for `quiz-core` operations.
pub type QuizResult<T> = Result<T, QuizError>;
