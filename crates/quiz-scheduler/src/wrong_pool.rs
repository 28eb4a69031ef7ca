//! Tracks questions a user has answered incorrectly until they are
//! mastered, guaranteeing at most one active entry per `(user_id, question_id)`.

use chrono::{DateTime, Utc};
use store_adapter::{Decode, Encode, Index, Key, StoreAdapter, StoreError, Table};

use quiz_domain::{QuestionId, SessionId, UserId, WrongEntry};

use crate::errors::SchedulerError;

/// Stable storage key for a wrong-pool entry: `(user_id, question_id)`.
///
/// The data model's nominal primary key is `(user_id, timestamp)`, but that
/// `timestamp` is rewritten on every reset (see [`WrongEntry::timestamp`]);
/// keying storage by `(user_id, question_id)` instead keeps a stable key
/// across resets while `timestamp` itself still carries the mutable sort
/// position `list_oldest` scans by.
fn entry_key(user_id: &UserId, question_id: &QuestionId) -> Key {
    Key::new(&[user_id.as_str(), question_id.as_str()])
}

/// Manages wrong-pool membership for a single user at a time, scoped to the
/// `user_id` passed into each operation.
#[derive(Debug, Default)]
pub struct WrongPoolManager;

impl WrongPoolManager {
    /// Adds a new entry after a first incorrect answer.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] wrapping [`StoreError::Conflict`] if
    /// an active entry for `question_id` already exists, or a transport error.
    pub fn add(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
        question_id: &QuestionId,
        session_id: SessionId,
        mastery_threshold: u8,
        now: DateTime<Utc>,
    ) -> Result<WrongEntry, SchedulerError> {
        if self.lookup_active(store, user_id, question_id)?.is_some() {
            return Err(SchedulerError::Store(StoreError::Conflict {
                table: "wrong_entries",
                reason: format!("active entry already exists for question {question_id}"),
            }));
        }
        let entry = WrongEntry::new(
            user_id.clone(),
            question_id.clone(),
            session_id,
            mastery_threshold,
            None,
            now,
        );
        store.put(Table::WrongEntries, &entry_key(user_id, question_id), entry.encode())?;
        Ok(entry)
    }

    /// Looks up the active (`remaining_correct > 0`) entry for `question_id`, if any.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn lookup_active(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
        question_id: &QuestionId,
    ) -> Result<Option<WrongEntry>, SchedulerError> {
        let records = store.query(
            Table::WrongEntries,
            user_id.as_str(),
            Some(Index::WrongEntriesByUserQuestion),
            None,
            true,
        )?;
        for record in records {
            let entry = decode_entry(&record)?;
            if entry.question_id == *question_id && entry.remaining_correct > 0 {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Up to `limit` active entries, oldest `timestamp` first.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport or decode failure.
    pub fn list_oldest(
        &self,
        store: &dyn StoreAdapter,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<WrongEntry>, SchedulerError> {
        let records = store.query(Table::WrongEntries, user_id.as_str(), None, None, true)?;
        let mut entries = Vec::new();
        for record in records {
            let entry = decode_entry(&record)?;
            if entry.remaining_correct > 0 {
                entries.push(entry);
            }
        }
        entries.truncate(limit);
        Ok(entries)
    }

    /// Records a correct re-presentation. Returns `true` if the entry became
    /// mastered and was evicted, `false` if it was persisted with a
    /// decremented streak.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport failure.
    pub fn record_correct(
        &self,
        store: &dyn StoreAdapter,
        entry: &mut WrongEntry,
        mastery_threshold: u8,
        now: DateTime<Utc>,
    ) -> Result<bool, SchedulerError> {
        entry.record_attempt(true, mastery_threshold, now);
        if entry.is_mastered() {
            self.evict(store, entry)?;
            Ok(true)
        } else {
            store.put(
                Table::WrongEntries,
                &entry_key(&entry.user_id, &entry.question_id),
                entry.encode(),
            )?;
            Ok(false)
        }
    }

    /// Records an incorrect re-presentation: resets the streak and re-freezes
    /// the presentation order on the next call to [`Self::freeze_order`].
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport failure.
    pub fn record_incorrect(
        &self,
        store: &dyn StoreAdapter,
        entry: &mut WrongEntry,
        mastery_threshold: u8,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulerError> {
        entry.record_attempt(false, mastery_threshold, now);
        entry.frozen_choice_order = None;
        store.put(
            Table::WrongEntries,
            &entry_key(&entry.user_id, &entry.question_id),
            entry.encode(),
        )?;
        Ok(())
    }

    /// One-time write of the shuffled choice order on first re-presentation.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport failure.
    pub fn freeze_order(
        &self,
        store: &dyn StoreAdapter,
        entry: &mut WrongEntry,
        ordered_choices: Vec<String>,
    ) -> Result<(), SchedulerError> {
        entry.frozen_choice_order = Some(ordered_choices);
        store.put(
            Table::WrongEntries,
            &entry_key(&entry.user_id, &entry.question_id),
            entry.encode(),
        )?;
        Ok(())
    }

    /// Removes an entry from storage.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Store`] on a transport failure.
    pub fn evict(&self, store: &dyn StoreAdapter, entry: &WrongEntry) -> Result<(), SchedulerError> {
        store.delete(Table::WrongEntries, &entry_key(&entry.user_id, &entry.question_id))?;
        Ok(())
    }
}

fn decode_entry(record: &store_adapter::Record) -> Result<WrongEntry, SchedulerError> {
    WrongEntry::decode(record)
        .map_err(|err| SchedulerError::Store(StoreError::Corrupted {
            field_path: err.to_string(),
        }))
}
