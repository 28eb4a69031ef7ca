//! Grades a submitted answer, drives the wrong-pool transitions, and decides
//! whether the session advances or the same question is retried.

use quiz_domain::{
    grade_answer, AnswerGrade, Choice, ChoiceId, QuestionId, Session, SessionId, UserId,
};
use quiz_scheduler::{DifficultyModel, ProgressTracker, QuestionCatalog, SessionStateManager, WrongPoolManager};

use crate::errors::{QuizError, QuizResult};
use crate::ports::Context;

/// A caller's submission for the current question in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAnswerRequest {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub selected: Vec<ChoiceId>,
    pub time_spent_s: u64,
}

/// What the caller should do next after a graded submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    NextQuestion,
    /// The same question, re-presented with `ordered_choices`.
    RetrySameQuestion { ordered_choices: Vec<Choice> },
}

/// Full result of resolving one answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnswer {
    pub grade: AnswerGrade,
    pub next_action: NextAction,
    /// `"(+1 Question @ k Tries)"`, present whenever the transition leaves a
    /// nonzero wrong-pool streak outstanding.
    pub penalty_indicator: Option<String>,
    pub session: Session,
}

fn penalty_indicator(remaining_correct: u8) -> Option<String> {
    (remaining_correct > 0).then(|| format!("(+1 Question @ {remaining_correct} Tries)"))
}

/// Drives the grade → wrong-pool → progress → session-advance → difficulty
/// pipeline for a single answer submission.
#[derive(Debug, Default)]
pub struct AnswerResolutionStateMachine;

impl AnswerResolutionStateMachine {
    /// Resolves `request` against its session, per the outcome table: an
    /// unseen miss opens a wrong-pool entry and retries; an active entry's
    /// correct answer decrements (or masters and evicts) it; either way a
    /// correct answer advances the session's cursor.
    ///
    /// # Errors
    /// Returns [`QuizError::SessionNotFound`]/[`QuizError::SessionNotServing`]
    /// if the session cannot currently accept an answer,
    /// [`QuizError::QuestionNotFound`] if the catalog no longer has the
    /// question, [`QuizError::InvalidAnswer`] on an empty selection, or
    /// [`QuizError::Concurrent`] if the session's atomic advance could not
    /// land after its configured retries (the wrong-pool and progress writes
    /// have already landed by that point and are safe to leave in place).
    pub fn submit_answer(
        &self,
        ctx: &Context,
        catalog: &dyn QuestionCatalog,
        request: SubmitAnswerRequest,
    ) -> QuizResult<ResolvedAnswer> {
        let now = ctx.now();
        let session_manager = SessionStateManager;
        let session = session_manager.get(ctx.store.as_ref(), request.session_id, &request.user_id, now)?;
        if !session.status.is_serving() {
            return Err(QuizError::SessionNotServing {
                session_id: request.session_id.to_string(),
            });
        }

        let question = catalog.get_question(&request.question_id).ok_or_else(|| QuizError::QuestionNotFound {
            question_id: request.question_id.to_string(),
        })?;

        let grade = grade_answer(&question, &request.selected)?;
        let correct = grade.is_correct();

        let wrong_pool = WrongPoolManager;
        let mastery_threshold = ctx.config.mastery_threshold;
        let prior_entry = wrong_pool.lookup_active(ctx.store.as_ref(), &request.user_id, &request.question_id)?;

        let (next_action, remaining_after, advances, advance_was_wrong) = match (prior_entry, correct) {
            (None, true) => (NextAction::NextQuestion, 0, true, false),
            (None, false) => {
                let mut entry = wrong_pool.add(
                    ctx.store.as_ref(),
                    &request.user_id,
                    &request.question_id,
                    request.session_id,
                    mastery_threshold,
                    now,
                )?;
                let mut choices = question.choices.clone();
                ctx.with_rng(|rng| {
                    use rand::seq::SliceRandom;
                    choices.shuffle(rng);
                });
                let order = choices.iter().map(|c| c.choice_id.to_string()).collect();
                wrong_pool.freeze_order(ctx.store.as_ref(), &mut entry, order)?;
                (NextAction::RetrySameQuestion { ordered_choices: choices }, entry.remaining_correct, false, false)
            }
            (Some(mut entry), true) => {
                wrong_pool.record_correct(ctx.store.as_ref(), &mut entry, mastery_threshold, now)?;
                (NextAction::NextQuestion, entry.remaining_correct, true, true)
            }
            (Some(mut entry), false) => {
                wrong_pool.record_incorrect(ctx.store.as_ref(), &mut entry, mastery_threshold, now)?;
                let mut choices = question.choices.clone();
                ctx.with_rng(|rng| {
                    use rand::seq::SliceRandom;
                    choices.shuffle(rng);
                });
                let order = choices.iter().map(|c| c.choice_id.to_string()).collect();
                wrong_pool.freeze_order(ctx.store.as_ref(), &mut entry, order)?;
                (NextAction::RetrySameQuestion { ordered_choices: choices }, entry.remaining_correct, false, false)
            }
        };

        let progress_tracker = ProgressTracker;
        progress_tracker.record_attempt(
            ctx.store.as_ref(),
            &request.user_id,
            &request.question_id,
            correct,
            request.time_spent_s,
            now,
        )?;

        let session = if advances {
            let question_id = request.question_id.clone();
            let time_spent_s = request.time_spent_s;
            session_manager.advance(
                ctx.store.as_ref(),
                request.session_id,
                &request.user_id,
                ctx.config.advance_retry_attempts,
                now,
                move |session| {
                    if session.progress.answered_ids.contains(&question_id) {
                        return Ok(());
                    }
                    session.progress.answered_ids.push(question_id.clone());
                    session.progress.cursor += 1;
                    if advance_was_wrong {
                        session.progress.wrong_count += 1;
                    } else {
                        session.progress.correct_count += 1;
                    }
                    session.progress.time_spent_s += time_spent_s;
                    Ok(())
                },
            )?
        } else {
            session
        };

        let difficulty_model = DifficultyModel;
        difficulty_model.record_outcome(
            ctx.store.as_ref(),
            &request.user_id,
            correct,
            ctx.config.difficulty_window,
            ctx.config.target_success_rate,
            ctx.config.difficulty_deadband,
            ctx.config.difficulty_delta,
        )?;

        Ok(ResolvedAnswer {
            grade,
            next_action,
            penalty_indicator: penalty_indicator(remaining_after),
            session,
        })
    }
}
