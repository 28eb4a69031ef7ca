//! Error type returned by every [`crate::adapter::StoreAdapter`] method.

use thiserror::Error;

/// Unified error type returned by [`crate::adapter::StoreAdapter`] implementations.
///
/// Version conflicts on a conditional update are NOT represented here — that
/// path returns [`crate::adapter::UpdateOutcome::Conflict`], a value, not an
/// error, matching the store's "conflict is a dedicated result" contract.
/// `Conflict` below instead covers constraint violations on unconditional
/// inserts (e.g. a uniqueness-indexed `add` racing another writer).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A point read or batch read found no record for the given key.
    #[error("no record found for key {key}")]
    NotFound { key: String },
    /// An unconditional insert violated a uniqueness constraint.
    #[error("constraint violated inserting into {table}: {reason}")]
    Conflict { table: &'static str, reason: String },
    /// Transient-error retries were exhausted.
    #[error("storage unavailable after {attempts} attempt(s)")]
    StorageUnavailable { attempts: u8 },
    /// A persisted record failed to decode.
    #[error("corrupted record at {field_path}")]
    Corrupted { field_path: String },
    /// A backing lock was found poisoned. `parking_lot` locks never poison,
    /// so this variant exists for shape parity with callers that pattern
    /// match it defensively; the in-memory backend never constructs it.
    #[error("lock on {resource} store data has been poisoned")]
    PoisonedLock { resource: &'static str },
}
