//! Per-user target-difficulty adjustment and per-question observed difficulty.

use store_adapter::{Decode, Encode, Key, StoreAdapter, StoreError, Table};

use quiz_domain::{QuestionId, UserDifficulty, UserId};

use crate::errors::SchedulerError;
use crate::progress_tracker::ProgressTracker;

/// Minimum number of recorded attempts before [`DifficultyModel::question_difficulty`]
/// will report a value; below this the sample is too thin to trust.
const MIN_ATTEMPTS_FOR_QUESTION_DIFFICULTY: usize = 10;

fn difficulty_key(user_id: &UserId) -> Key {
    Key::new(&[user_id.as_str()])
}

/// Tracks each user's target difficulty and derives each question's observed
/// difficulty from the attempt history, per the configured target success
/// rate `T` and adjustment step `Δ`.
#[derive(Debug, Default)]
pub struct DifficultyModel;

impl DifficultyModel {
    /// Fetches the user's current target difficulty, seeding
    /// [`UserDifficulty::initial`] on first access.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn get_or_init(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
    ) -> Result<UserDifficulty, SchedulerError> {
        match store.get(Table::UserDifficulty, &difficulty_key(user_id))? {
            Some(record) => decode_difficulty(&record),
            None => Ok(UserDifficulty::initial(user_id.clone())),
        }
    }

    /// Folds a graded outcome into the user's rolling window. Once the
    /// window fills to `window` entries, nudges `target_difficulty` toward
    /// the configured success rate exactly once — push it up by `Δ` if the
    /// observed rate clears `T + δ`, pull it down by `Δ/2` if the rate falls
    /// below `T − δ` (the smaller decrement guards against collapsing toward
    /// the floor), leave it unchanged inside the deadband — and then clears
    /// the window so the next `window` outcomes are judged on their own.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn record_outcome(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
        correct: bool,
        window: usize,
        target_success_rate: f64,
        deadband: f64,
        delta: f64,
    ) -> Result<UserDifficulty, SchedulerError> {
        let mut difficulty = self.get_or_init(store, user_id)?;
        difficulty.push_outcome(correct);
        if difficulty.recent_outcomes.len() >= window {
            if let Some(rate) = difficulty.recent_success_rate() {
                if rate > target_success_rate + deadband {
                    difficulty.adjust(delta);
                } else if rate < target_success_rate - deadband {
                    difficulty.adjust(-0.5 * delta);
                }
            }
            difficulty.recent_outcomes.clear();
        }
        store.put(Table::UserDifficulty, &difficulty_key(user_id), difficulty.encode())?;
        Ok(difficulty)
    }

    /// Observed difficulty for `question_id`, derived from every recorded
    /// attempt across all users: `0.8 * (1 - success_rate) + 0.2 *
    /// clamp(avg_time_s / 120, 0, 1)`. Returns `None` until at least
    /// [`MIN_ATTEMPTS_FOR_QUESTION_DIFFICULTY`] attempts have accumulated.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn question_difficulty(
        &self,
        store: &dyn StoreAdapter,
        question_id: &QuestionId,
    ) -> Result<Option<f64>, SchedulerError> {
        let tracker = ProgressTracker;
        let rows = tracker.all_for_question(store, question_id)?;
        let attempts_total: u32 = rows.iter().map(|p| p.attempts_total).sum();
        if (attempts_total as usize) < MIN_ATTEMPTS_FOR_QUESTION_DIFFICULTY {
            return Ok(None);
        }
        let attempts_correct: u32 = rows.iter().map(|p| p.attempts_correct).sum();
        let cumulative_time_s: u64 = rows.iter().map(|p| p.cumulative_time_s).sum();

        let success_rate = f64::from(attempts_correct) / f64::from(attempts_total);
        let avg_time_s = cumulative_time_s as f64 / f64::from(attempts_total);
        let time_component = (avg_time_s / 120.0).clamp(0.0, 1.0);
        Ok(Some(0.8 * (1.0 - success_rate) + 0.2 * time_component))
    }
}

fn decode_difficulty(record: &store_adapter::Record) -> Result<UserDifficulty, SchedulerError> {
    UserDifficulty::decode(record).map_err(|err| {
        SchedulerError::Store(StoreError::Corrupted {
            field_path: err.to_string(),
        })
    })
}
