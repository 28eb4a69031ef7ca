//! A single table's storage: one `parking_lot::RwLock` guarding a `HashMap`.
//!
//! Guarding each table independently (rather than one lock for the whole
//! store) lets distinct sessions advance concurrently while a single
//! session's advances still serialize on its own table's lock.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::adapter::{Key, UpdateOutcome};
use crate::codec::Record;
use crate::errors::StoreError;

#[derive(Debug, Default)]
pub struct TableStore {
    rows: RwLock<HashMap<String, Record>>,
}

impl TableStore {
    pub fn get(&self, key: &Key) -> Option<Record> {
        self.rows.read().get(&key.0).cloned()
    }

    pub fn put(&self, key: &Key, record: Record) {
        self.rows.write().insert(key.0.clone(), record);
    }

    pub fn delete(&self, key: &Key) {
        self.rows.write().remove(&key.0);
    }

    pub fn batch_get(&self, keys: &[Key]) -> Vec<Option<Record>> {
        let rows = self.rows.read();
        keys.iter().map(|key| rows.get(&key.0).cloned()).collect()
    }

    /// All stored records, for callers that apply their own index filtering.
    pub fn all(&self) -> Vec<Record> {
        self.rows.read().values().cloned().collect()
    }

    /// Compare-and-set: holds the write lock for the whole read-mutate-write
    /// cycle so a concurrent writer on the same table can't interleave.
    pub fn update_conditional(
        &self,
        key: &Key,
        expected_version: u64,
        mutation: &dyn Fn(&mut Record),
    ) -> Result<UpdateOutcome, StoreError> {
        let mut rows = self.rows.write();
        let record = rows.get_mut(&key.0).ok_or_else(|| StoreError::NotFound {
            key: key.0.clone(),
        })?;
        let current_version = record
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if current_version != expected_version {
            return Ok(UpdateOutcome::Conflict);
        }
        mutation(record);
        let new_version = expected_version + 1;
        record["version"] = serde_json::Value::Number(new_version.into());
        Ok(UpdateOutcome::Applied { new_version })
    }
}
