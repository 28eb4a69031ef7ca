//! The top-level facade: one [`QuizEngine`] per process, many sessions,
//! all state in the injected [`Context`]'s store.

use std::sync::Arc;

use quiz_domain::{Session, SessionConfig, SessionId, SessionStatus, UserId};
use quiz_scheduler::{QuestionCatalog, SessionStateManager};

use crate::errors::QuizResult;
use crate::ports::Context;
use crate::resolution::{AnswerResolutionStateMachine, ResolvedAnswer, SubmitAnswerRequest};
use crate::selection::{AdaptiveSelectionEngine, SelectionOutcome};

/// Coordinates session lifecycle, question selection, and answer grading
/// against a single question catalog and store.
///
/// Holds no per-session state itself; every operation round-trips through
/// [`Context::store`], so a [`QuizEngine`] is cheap to clone (via a fresh
/// `Context`) and safe to share across requests.
pub struct QuizEngine {
    ctx: Context,
    catalog: Arc<dyn QuestionCatalog>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(ctx: Context, catalog: Arc<dyn QuestionCatalog>) -> Self {
        Self { ctx, catalog }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Builds a session's fixed question pool from the catalog and persists
    /// it in `created` status.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::InvalidSessionConfig`] or
    /// [`crate::errors::QuizError::InsufficientQuestions`] if `config` can't
    /// be satisfied, or a propagated store error.
    pub fn create_session(&self, user_id: UserId, config: SessionConfig) -> QuizResult<Session> {
        let now = self.ctx.now();
        let session = SessionStateManager.create(
            self.ctx.store.as_ref(),
            self.catalog.as_ref(),
            user_id,
            config,
            &self.ctx.config,
            now,
        )?;
        Ok(session)
    }

    /// Fetches a session by id, applying lazy expiry and ownership checks.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::SessionNotFound`] if the session
    /// doesn't exist, or exists under a different user.
    pub fn get_session(&self, session_id: SessionId, user_id: &UserId) -> QuizResult<Session> {
        let now = self.ctx.now();
        Ok(SessionStateManager.get(self.ctx.store.as_ref(), session_id, user_id, now)?)
    }

    /// Moves `session_id` from `created` to `active`, allowing it to start
    /// serving questions.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::InvalidTransition`] if the
    /// session is not currently `created`.
    pub fn start_session(&self, session_id: SessionId, user_id: &UserId) -> QuizResult<Session> {
        self.transition(session_id, user_id, SessionStatus::Active)
    }

    /// Moves an `active` session to `paused`.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::InvalidTransition`] if the
    /// session is not currently `active`.
    pub fn pause_session(&self, session_id: SessionId, user_id: &UserId) -> QuizResult<Session> {
        self.transition(session_id, user_id, SessionStatus::Paused)
    }

    /// Moves a `paused` session back to `active`.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::InvalidTransition`] if the
    /// session is not currently `paused`.
    pub fn resume_session(&self, session_id: SessionId, user_id: &UserId) -> QuizResult<Session> {
        self.transition(session_id, user_id, SessionStatus::Active)
    }

    /// Cancels a `created`, `active`, or `paused` session.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::InvalidTransition`] if the
    /// session has already reached a terminal status.
    pub fn cancel_session(&self, session_id: SessionId, user_id: &UserId) -> QuizResult<Session> {
        self.transition(session_id, user_id, SessionStatus::Cancelled)
    }

    fn transition(&self, session_id: SessionId, user_id: &UserId, next: SessionStatus) -> QuizResult<Session> {
        let now = self.ctx.now();
        let session = SessionStateManager.transition_status(
            self.ctx.store.as_ref(),
            session_id,
            user_id,
            next,
            self.ctx.config.advance_retry_attempts,
            now,
        )?;
        Ok(session)
    }

    /// Selects the next question to serve, or reports that `session_id` has
    /// run its course.
    ///
    /// # Errors
    /// Returns [`crate::errors::QuizError::SessionNotServing`] if the
    /// session's status cannot currently serve questions, or a propagated
    /// scheduler/catalog error.
    pub fn next_question(&self, session_id: SessionId, user_id: &UserId) -> QuizResult<SelectionOutcome> {
        let session = self.get_session(session_id, user_id)?;
        AdaptiveSelectionEngine.select(&self.ctx, self.catalog.as_ref(), &session, user_id)
    }

    /// Grades a submitted answer and drives the wrong-pool, progress,
    /// session-advance, and difficulty side effects.
    ///
    /// # Errors
    /// See [`AnswerResolutionStateMachine::submit_answer`].
    pub fn submit_answer(&self, request: SubmitAnswerRequest) -> QuizResult<ResolvedAnswer> {
        AnswerResolutionStateMachine.submit_answer(&self.ctx, self.catalog.as_ref(), request)
    }
}
