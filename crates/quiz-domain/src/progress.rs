//! Per-user, per-question attempt history and per-user target difficulty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{QuestionId, UserId};

/// Cumulative attempt history for one `(user_id, question_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub attempts_total: u32,
    pub attempts_correct: u32,
    pub attempts_incorrect: u32,
    pub first_seen_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
    pub cumulative_time_s: u64,
}

impl Progress {
    /// Opens a fresh record for a question the user has never attempted.
    #[must_use]
    pub fn first_attempt(
        user_id: UserId,
        question_id: QuestionId,
        correct: bool,
        time_spent_s: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            question_id,
            attempts_total: 1,
            attempts_correct: u32::from(correct),
            attempts_incorrect: u32::from(!correct),
            first_seen_at: now,
            last_attempt_at: now,
            cumulative_time_s: time_spent_s,
        }
    }

    /// Folds a subsequent attempt into the record.
    pub fn record_attempt(&mut self, correct: bool, time_spent_s: u64, now: DateTime<Utc>) {
        self.attempts_total += 1;
        if correct {
            self.attempts_correct += 1;
        } else {
            self.attempts_incorrect += 1;
        }
        self.cumulative_time_s += time_spent_s;
        self.last_attempt_at = now;
    }

    /// A question is considered mastered once it has at least one correct
    /// attempt and no outstanding wrong-pool membership; this flag only
    /// reflects the attempt-history half of that rule (never attempted
    /// incorrectly, or every incorrect attempt has since been answered
    /// correctly at least once).
    #[must_use]
    pub fn mastery_flag(&self) -> bool {
        self.attempts_correct > 0 && self.attempts_incorrect == 0
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts_total == 0 {
            0.0
        } else {
            f64::from(self.attempts_correct) / f64::from(self.attempts_total)
        }
    }
}

/// A user's current estimated ability, on the `[0.1, 1.0]` scale.
///
/// Also carries the rolling window of recent graded outcomes the difficulty
/// model reads `target_difficulty`'s update rule from. The persisted schema
/// names exactly five tables; rather than add a sixth for this ledger, it
/// rides along on the one entity that already exists per-user and is
/// rewritten after every answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDifficulty {
    pub user_id: UserId,
    pub target_difficulty: f64,
    pub recent_outcomes: Vec<bool>,
}

impl UserDifficulty {
    pub const DEFAULT_TARGET: f64 = 0.5;
    pub const MIN_TARGET: f64 = 0.1;
    pub const MAX_TARGET: f64 = 1.0;

    /// Starts a new user at the midpoint of the difficulty scale with an
    /// empty outcome history.
    #[must_use]
    pub fn initial(user_id: UserId) -> Self {
        Self {
            user_id,
            target_difficulty: Self::DEFAULT_TARGET,
            recent_outcomes: Vec::new(),
        }
    }

    /// Applies a signed delta, clamping back into `[MIN_TARGET, MAX_TARGET]`.
    pub fn adjust(&mut self, delta: f64) {
        self.target_difficulty = (self.target_difficulty + delta).clamp(Self::MIN_TARGET, Self::MAX_TARGET);
    }

    /// Appends a graded outcome to the current tumbling window. The window
    /// is evaluated and cleared by [`crate::UserDifficulty::recent_success_rate`]'s
    /// caller once it fills, rather than sliding one entry at a time — see
    /// `quiz_scheduler::DifficultyModel::record_outcome`.
    pub fn push_outcome(&mut self, correct: bool) {
        self.recent_outcomes.push(correct);
    }

    /// Success rate over the current window, or `None` if no outcomes have
    /// been recorded yet.
    #[must_use]
    pub fn recent_success_rate(&self) -> Option<f64> {
        if self.recent_outcomes.is_empty() {
            return None;
        }
        let correct = self.recent_outcomes.iter().filter(|&&c| c).count();
        Some(correct as f64 / self.recent_outcomes.len() as f64)
    }
}
