//! Records of recently missed questions awaiting mastery re-presentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{QuestionId, SessionId, UserId};

/// One graded attempt at a wrong-pool entry, appended on every re-presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub timestamp: DateTime<Utc>,
    pub correct: bool,
}

/// A question a user answered incorrectly, tracked until it is answered
/// correctly `remaining_correct` more times in a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongEntry {
    pub user_id: UserId,
    pub question_id: QuestionId,
    /// The other half of the entry's nominal `(user_id, timestamp)` composite
    /// key: the instant this question most recently entered the pool, i.e.
    /// the first miss or the most recent reset. Unlike `last_attempt_at`,
    /// this does not move on a correct re-presentation, which is what makes
    /// it the right tiebreak for spaced-repetition ordering.
    pub timestamp: DateTime<Utc>,
    /// Session in which the entry was first created.
    pub originating_session_id: SessionId,
    /// Number of further correct answers needed before the entry is evicted.
    pub remaining_correct: u8,
    /// Choice order frozen at first miss, reused on every re-presentation so
    /// the user doesn't see the options reshuffle mid-streak.
    pub frozen_choice_order: Option<Vec<String>>,
    pub attempts: Vec<Attempt>,
    pub last_attempt_at: DateTime<Utc>,
}

impl WrongEntry {
    /// Starts a new wrong-pool entry at the configured streak requirement `m`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        question_id: QuestionId,
        originating_session_id: SessionId,
        m: u8,
        frozen_choice_order: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            question_id,
            timestamp: now,
            originating_session_id,
            remaining_correct: m,
            frozen_choice_order,
            attempts: vec![Attempt {
                timestamp: now,
                correct: false,
            }],
            last_attempt_at: now,
        }
    }

    /// Records a re-presentation attempt. A correct answer decrements the
    /// remaining streak; an incorrect answer resets it back to `m` and
    /// re-stamps `timestamp`, since a reset re-enters the question into the
    /// pool as of this instant.
    pub fn record_attempt(&mut self, correct: bool, m: u8, now: DateTime<Utc>) {
        self.attempts.push(Attempt {
            timestamp: now,
            correct,
        });
        self.last_attempt_at = now;
        if correct {
            self.remaining_correct = self.remaining_correct.saturating_sub(1);
        } else {
            self.remaining_correct = m;
            self.timestamp = now;
        }
    }

    /// Whether the streak requirement has been satisfied and this entry
    /// should be evicted from the wrong pool.
    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.remaining_correct == 0
    }
}
