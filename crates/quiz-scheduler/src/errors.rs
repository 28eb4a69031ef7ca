//! Error types returned by the scheduler's components.

use thiserror::Error;
use store_adapter::StoreError;

/// Errors returned by [`crate::wrong_pool::WrongPoolManager`],
/// [`crate::progress_tracker::ProgressTracker`], [`crate::difficulty::DifficultyModel`],
/// and [`crate::session_manager::SessionStateManager`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A session-creation request was malformed: empty name, empty or
    /// oversized `sources`, a zero `question_count`, or `planned_total`
    /// exceeding the configured ceiling.
    #[error("invalid session config: {reason}")]
    InvalidSessionConfig { reason: String },
    /// A status transition was attempted that the allowed-transitions table forbids.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    /// Requested more questions than the catalog could supply.
    #[error("catalog has only {available} questions matching the request, needed {requested}")]
    InsufficientQuestions { requested: u32, available: u32 },
    /// Optimistic-concurrency retries were exhausted on an atomic advance.
    #[error("session advance conflicted {attempts} time(s) in a row")]
    Concurrent { attempts: u8 },
    /// The requested session does not exist, or exists under a different user.
    #[error("session {session_id} not found for user {user_id}")]
    SessionNotFound { session_id: String, user_id: String },
}
