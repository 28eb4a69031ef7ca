//! Chooses the next question to serve: wrong-pool vs regular, spaced
//! repetition readiness, and difficulty matching.

use rand::seq::SliceRandom;
use rand::Rng;

use quiz_domain::{Choice, Question, QuestionId, Session, SessionStatus, UserId, WrongEntry};
use quiz_scheduler::{DifficultyModel, QuestionCatalog, SessionStateManager, WrongPoolManager};

use crate::errors::{QuizError, QuizResult};
use crate::ports::Context;

/// A question handed to the caller, in its presentation order, plus the
/// bookkeeping the Answer Resolution State Machine needs to grade a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedQuestion {
    pub question_id: QuestionId,
    pub prompt: String,
    pub ordered_choices: Vec<Choice>,
    pub from_wrong_pool: bool,
    /// `remaining_correct` after this presentation's prior outcome, carried
    /// as `remaining_tries` per the data model's wrong-pool view.
    pub remaining_tries: Option<u8>,
}

/// Result of asking the engine for the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Next(SelectedQuestion),
    SessionComplete,
}

/// Fisher-Yates permutation of `choices`, preserving each element's
/// identity and only changing order.
fn shuffle_choices(choices: &mut [Choice], rng: &mut impl Rng) {
    choices.shuffle(rng);
}

fn readiness(entry: &WrongEntry, spaced_intervals_h: &[f64], now: chrono::DateTime<chrono::Utc>) -> f64 {
    let age_h = (now - entry.last_attempt_at).num_seconds() as f64 / 3600.0;
    let index = entry.attempts.len().saturating_sub(1).min(spaced_intervals_h.len() - 1);
    let expected_interval_h = spaced_intervals_h[index];
    let correct = entry.attempts.iter().filter(|a| a.correct).count();
    let recent_success_rate = correct as f64 / entry.attempts.len() as f64;
    (age_h / expected_interval_h).min(2.0) + (1.0 - recent_success_rate).max(0.0) * 0.5
}

/// Two-tier question picker: a wrong-answer pool prioritized by spaced
/// repetition and struggle, and a regular pool filtered by adaptive
/// difficulty, mixed under a configurable probability.
#[derive(Debug, Default)]
pub struct AdaptiveSelectionEngine;

impl AdaptiveSelectionEngine {
    /// Selects the next question for `session`, or reports completion.
    ///
    /// # Errors
    /// Returns [`QuizError::SessionNotServing`] if the session's status
    /// cannot currently serve questions, or a propagated scheduler/catalog
    /// error.
    pub fn select(
        &self,
        ctx: &Context,
        catalog: &dyn QuestionCatalog,
        session: &Session,
        user_id: &UserId,
    ) -> QuizResult<SelectionOutcome> {
        if !session.status.is_serving() {
            return Err(QuizError::SessionNotServing {
                session_id: session.session_id.to_string(),
            });
        }

        let wrong_pool = WrongPoolManager;
        let oldest_active = wrong_pool.list_oldest(ctx.store.as_ref(), user_id, 5)?;

        let exhausted_pool = session.progress.cursor as usize >= session.question_pool.len();
        if exhausted_pool && oldest_active.is_empty() {
            self.complete_session(ctx, session, user_id)?;
            return Ok(SelectionOutcome::SessionComplete);
        }

        let draw_wrong_pool = !oldest_active.is_empty()
            && ctx.with_rng(|rng| rng.gen::<f64>()) < ctx.config.wrong_pool_probability;

        if draw_wrong_pool {
            return self.select_from_wrong_pool(ctx, catalog, user_id, &oldest_active);
        }

        let candidates: Vec<QuestionId> = session
            .question_pool
            .iter()
            .filter(|id| !session.progress.answered_ids.contains(id))
            .cloned()
            .collect();

        if candidates.is_empty() {
            if oldest_active.is_empty() {
                self.complete_session(ctx, session, user_id)?;
                return Ok(SelectionOutcome::SessionComplete);
            }
            return self.select_from_wrong_pool(ctx, catalog, user_id, &oldest_active);
        }

        self.select_regular(ctx, catalog, user_id, &candidates)
    }

    /// Transitions `session` to `completed` (the call that discovers
    /// completion is the one that drives the transition) and fires the
    /// best-effort `session_completed` observer notification.
    fn complete_session(&self, ctx: &Context, session: &Session, user_id: &UserId) -> QuizResult<()> {
        let session_manager = SessionStateManager;
        session_manager.transition_status(
            ctx.store.as_ref(),
            session.session_id,
            user_id,
            SessionStatus::Completed,
            ctx.config.advance_retry_attempts,
            ctx.now(),
        )?;
        ctx.notify_session_completed(session.session_id, user_id, &session.progress);
        Ok(())
    }

    fn select_from_wrong_pool(
        &self,
        ctx: &Context,
        catalog: &dyn QuestionCatalog,
        user_id: &UserId,
        candidates: &[WrongEntry],
    ) -> QuizResult<SelectionOutcome> {
        let now = ctx.now();
        let mut best: Option<&WrongEntry> = None;
        let mut best_score = f64::MIN;
        for entry in candidates {
            let score = readiness(entry, &ctx.config.spaced_intervals_h, now);
            let is_better = match best {
                None => true,
                Some(current) => {
                    score > best_score
                        || ((score - best_score).abs() < f64::EPSILON
                            && entry.timestamp < current.timestamp)
                }
            };
            if is_better {
                best = Some(entry);
                best_score = score;
            }
        }
        let mut entry = best.expect("candidates is non-empty").clone();

        let question = catalog.get_question(&entry.question_id).ok_or_else(|| QuizError::QuestionNotFound {
            question_id: entry.question_id.to_string(),
        })?;

        let wrong_pool = WrongPoolManager;
        let ordered_choices = match &entry.frozen_choice_order {
            Some(order) => order_choices(&question, order),
            None => {
                let mut choices = question.choices.clone();
                ctx.with_rng(|rng| shuffle_choices(&mut choices, rng));
                let order = choices.iter().map(|c| c.choice_id.to_string()).collect();
                wrong_pool.freeze_order(ctx.store.as_ref(), &mut entry, order)?;
                choices
            }
        };

        Ok(SelectionOutcome::Next(SelectedQuestion {
            question_id: question.question_id,
            prompt: question.prompt,
            ordered_choices,
            from_wrong_pool: true,
            remaining_tries: Some(entry.remaining_correct),
        }))
    }

    fn select_regular(
        &self,
        ctx: &Context,
        catalog: &dyn QuestionCatalog,
        user_id: &UserId,
        candidates: &[QuestionId],
    ) -> QuizResult<SelectionOutcome> {
        let difficulty_model = DifficultyModel;
        let target_difficulty = difficulty_model.get_or_init(ctx.store.as_ref(), user_id)?.target_difficulty;

        let mut best_question: Option<Question> = None;
        let mut best_score = f64::MIN;
        for question_id in candidates {
            let question = catalog.get_question(question_id).ok_or_else(|| QuizError::QuestionNotFound {
                question_id: question_id.to_string(),
            })?;
            let difficulty = difficulty_model
                .question_difficulty(ctx.store.as_ref(), question_id)?
                .unwrap_or_else(|| question.declared_difficulty.to_target_scale());
            let exploration = ctx.with_rng(|rng| rng.gen_range(0.8..=1.2));
            let score = (1.0 - (difficulty - target_difficulty).abs()) * exploration;
            if score > best_score {
                best_score = score;
                best_question = Some(question);
            }
        }

        let mut question = best_question.expect("candidates is non-empty");
        ctx.with_rng(|rng| shuffle_choices(&mut question.choices, rng));

        Ok(SelectionOutcome::Next(SelectedQuestion {
            question_id: question.question_id,
            prompt: question.prompt,
            ordered_choices: question.choices,
            from_wrong_pool: false,
            remaining_tries: None,
        }))
    }
}

/// Rebuilds a question's choice list in a previously frozen order, looking
/// each id up by `choice_id`.
fn order_choices(question: &Question, order: &[String]) -> Vec<Choice> {
    order
        .iter()
        .filter_map(|id| question.choices.iter().find(|c| c.choice_id.as_str() == id).cloned())
        .collect()
}
