//! A user's attempt at a fixed question pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{QuestionId, SessionId, UserId};

/// One content source contributing questions to a session's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSource {
    pub category: Option<String>,
    pub provider: Option<String>,
    pub certificate: Option<String>,
    pub language: Option<String>,
    pub question_count: u32,
}

/// Caller-supplied configuration for a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub sources: Vec<SessionSource>,
    pub settings: std::collections::BTreeMap<String, String>,
    pub planned_total: u32,
    pub estimated_seconds: u32,
}

/// Per-session mutable progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionProgress {
    pub cursor: u32,
    pub answered_ids: Vec<QuestionId>,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub time_spent_s: u64,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Active,
    Paused,
    Completed,
    Expired,
    Cancelled,
}

impl SessionStatus {
    /// Whether `self -> next` is one of the allowed transitions from the
    /// data model (`created -> {active, cancelled}`,
    /// `active -> {paused, completed, cancelled}`,
    /// `paused -> {active, cancelled}`; `completed`/`cancelled` are terminal).
    #[must_use]
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::{Active, Cancelled, Completed, Created, Expired, Paused};
        matches!(
            (self, next),
            (Created, Active)
                | (Created, Cancelled)
                | (Active, Paused)
                | (Active, Completed)
                | (Active, Cancelled)
                | (Active, Expired)
                | (Paused, Active)
                | (Paused, Cancelled)
                | (Paused, Expired)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Whether the session can currently serve questions (§4.G step 1).
    #[must_use]
    pub fn is_serving(self) -> bool {
        matches!(self, SessionStatus::Created | SessionStatus::Active)
    }
}

/// Raised when an illegal status transition is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot transition session from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

/// A user's attempt at a fixed pool of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub config: SessionConfig,
    pub question_pool: Vec<QuestionId>,
    pub progress: SessionProgress,
    pub status: SessionStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Applies a status transition, validating it against the allowed table.
    ///
    /// # Errors
    /// Returns [`InvalidTransition`] if the transition is not permitted.
    pub fn transition_to(&mut self, next: SessionStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Whether `expires_at` has passed and the session has not yet reached a
    /// terminal status; callers use this to lazily surface `expired`.
    #[must_use]
    pub fn has_lapsed(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.status != SessionStatus::Expired && self.expires_at < now
    }
}
