//! store-adapter — typed persistence facade, entity codec, and an
//! in-memory reference backend for the adaptive quiz engine.

pub mod adapter;
pub mod backoff;
pub mod codec;
pub mod config;
pub mod errors;
pub mod memory;

/// Storage configuration and tuning knobs.
pub use config::StorageConfig;
/// Entity (de)serialization.
pub use codec::{Decode, Encode, Record};
/// Unified storage error type.
pub use errors::StoreError;
/// Backoff helper used by higher layers wrapping adapter calls.
pub use backoff::retry_with_backoff;
/// The storage facade trait and its supporting types.
pub use adapter::{Index, Key, StoreAdapter, Table, UpdateOutcome};
/// Reference in-memory backend.
pub use memory::InMemoryStore;
