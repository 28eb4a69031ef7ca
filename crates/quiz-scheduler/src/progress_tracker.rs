//! Append-only per-`(user_id, question_id)` attempt history.

use chrono::{DateTime, Utc};
use store_adapter::{Decode, Encode, Key, StoreAdapter, StoreError, Table};

use quiz_domain::{Progress, QuestionId, UserId};

use crate::errors::SchedulerError;

fn progress_key(user_id: &UserId, question_id: &QuestionId) -> Key {
    Key::new(&[user_id.as_str(), question_id.as_str()])
}

/// Records and fetches per-question attempt tallies. Never decrements a
/// counter; the tracker is strictly append-style.
#[derive(Debug, Default)]
pub struct ProgressTracker;

impl ProgressTracker {
    /// Inserts a fresh row on the user's first attempt at `question_id`, or
    /// folds a subsequent attempt into the existing one.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn record_attempt(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
        question_id: &QuestionId,
        correct: bool,
        time_s: u64,
        now: DateTime<Utc>,
    ) -> Result<Progress, SchedulerError> {
        let key = progress_key(user_id, question_id);
        let progress = match store.get(Table::Progress, &key)? {
            Some(record) => {
                let mut progress = decode_progress(&record)?;
                progress.record_attempt(correct, time_s, now);
                progress
            }
            None => Progress::first_attempt(user_id.clone(), question_id.clone(), correct, time_s, now),
        };
        store.put(Table::Progress, &key, progress.encode())?;
        Ok(progress)
    }

    /// Fetches the current tally for `(user_id, question_id)`, if any attempt
    /// has been recorded.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn get(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
        question_id: &QuestionId,
    ) -> Result<Option<Progress>, SchedulerError> {
        match store.get(Table::Progress, &progress_key(user_id, question_id))? {
            Some(record) => Ok(Some(decode_progress(&record)?)),
            None => Ok(None),
        }
    }

    /// All progress rows recorded against `question_id`, across every user
    /// who has attempted it — the input to [`crate::difficulty::DifficultyModel::question_difficulty`].
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn all_for_question(
        &self,
        store: &dyn StoreAdapter,
        question_id: &QuestionId,
    ) -> Result<Vec<Progress>, SchedulerError> {
        let records = store.query(
            Table::Progress,
            question_id.as_str(),
            Some(store_adapter::Index::ProgressByQuestionLastAttempt),
            None,
            true,
        )?;
        records.iter().map(decode_progress).collect()
    }
}

fn decode_progress(record: &store_adapter::Record) -> Result<Progress, SchedulerError> {
    Progress::decode(record).map_err(|err| {
        SchedulerError::Store(StoreError::Corrupted {
            field_path: err.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_adapter::InMemoryStore;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn first_attempt_creates_a_row() {
        let store = InMemoryStore::default();
        let tracker = ProgressTracker;
        let progress = tracker
            .record_attempt(&store, &UserId::from("u1"), &QuestionId::from("q1"), true, 10, now())
            .unwrap();
        assert_eq!(progress.attempts_total, 1);
    }

    #[test]
    fn subsequent_attempts_accumulate() {
        let store = InMemoryStore::default();
        let tracker = ProgressTracker;
        let user_id = UserId::from("u1");
        let question_id = QuestionId::from("q1");
        tracker
            .record_attempt(&store, &user_id, &question_id, true, 10, now())
            .unwrap();
        let progress = tracker
            .record_attempt(&store, &user_id, &question_id, false, 5, now())
            .unwrap();
        assert_eq!(progress.attempts_total, 2);
        assert_eq!(progress.attempts_correct, 1);
        assert_eq!(progress.attempts_incorrect, 1);
        assert_eq!(progress.cumulative_time_s, 15);
    }

    #[test]
    fn get_returns_none_for_unattempted_question() {
        let store = InMemoryStore::default();
        let tracker = ProgressTracker;
        let found = tracker
            .get(&store, &UserId::from("u1"), &QuestionId::from("q1"))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn all_for_question_aggregates_across_users() {
        let store = InMemoryStore::default();
        let tracker = ProgressTracker;
        let question_id = QuestionId::from("q1");
        tracker
            .record_attempt(&store, &UserId::from("u1"), &question_id, true, 10, now())
            .unwrap();
        tracker
            .record_attempt(&store, &UserId::from("u2"), &question_id, false, 20, now())
            .unwrap();
        let all = tracker.all_for_question(&store, &question_id).unwrap();
        assert_eq!(all.len(), 2);
    }
}
