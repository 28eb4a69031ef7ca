//! Typed facade over a partitioned key-value store with secondary indices.

use crate::codec::Record;
use crate::errors::StoreError;

/// One of the five logical tables in the persisted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Sessions,
    Questions,
    WrongEntries,
    Progress,
    UserDifficulty,
}

/// A table's primary key, opaque to the adapter: backends hash or compose
/// it as needed, callers only ever compare keys for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(parts: &[&str]) -> Self {
        Self(parts.join("\u{1}"))
    }
}

/// A secondary index selector passed to [`StoreAdapter::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    /// `sessions`: `(user_id, status)`.
    SessionsByUserStatus,
    /// `questions`: `(category, language)`.
    QuestionsByCategoryLanguage,
    /// `questions`: `(provider, certificate)`.
    QuestionsByProviderCertificate,
    /// `wrong_entries`: `(user_id, question_id)`, used for uniqueness checks.
    WrongEntriesByUserQuestion,
    /// `progress`: `(question_id, last_attempt_at)`.
    ProgressByQuestionLastAttempt,
}

/// Result of a version-guarded conditional update: a dedicated value, never
/// an error, matching the adapter's "conflict is a result, not a failure"
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The predicate held; the mutation was applied and this is the new version.
    Applied { new_version: u64 },
    /// The predicate did not hold; nothing was written.
    Conflict,
}

/// Typed facade over a key-value store exposing point reads, ordered range
/// reads over secondary indices, conditional writes, and chunked batch
/// reads. Implementations are the only place transport-level retry lives.
pub trait StoreAdapter: Send + Sync {
    /// Point read. Returns `Ok(None)` when the key is absent (absence is not
    /// an error at this layer; callers that require the record map it to
    /// [`StoreError::NotFound`]).
    ///
    /// # Errors
    /// Returns [`StoreError`] on a transport-level failure.
    fn get(&self, table: Table, key: &Key) -> Result<Option<Record>, StoreError>;

    /// Unconditional write. Overwrites any existing record at `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if `table` enforces a uniqueness
    /// constraint this write violates, or [`StoreError`] on transport failure.
    fn put(&self, table: Table, key: &Key, record: Record) -> Result<(), StoreError>;

    /// Compare-and-set: applies `mutation` to the current record and writes
    /// it back only if `expected_version` matches the stored `version`
    /// field. The current record is read fresh inside the same critical
    /// section the write happens in.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if `key` does not exist, or
    /// [`StoreError`] on transport failure.
    fn update_conditional(
        &self,
        table: Table,
        key: &Key,
        expected_version: u64,
        mutation: &dyn Fn(&mut Record),
    ) -> Result<UpdateOutcome, StoreError>;

    /// Ordered range read over `partition_key`, optionally via a secondary
    /// `index`, bounded by `limit`.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure.
    fn query(
        &self,
        table: Table,
        partition_key: &str,
        index: Option<Index>,
        limit: Option<usize>,
        ascending: bool,
    ) -> Result<Vec<Record>, StoreError>;

    /// Chunked batch read. Implementations split `keys` into the store's
    /// per-request limit internally; callers see one logical call.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure.
    fn batch_get(&self, table: Table, keys: &[Key]) -> Result<Vec<Option<Record>>, StoreError>;

    /// Deletes the record at `key`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure.
    fn delete(&self, table: Table, key: &Key) -> Result<(), StoreError>;
}
