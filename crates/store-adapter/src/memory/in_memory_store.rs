//! Reference in-memory implementation of [`StoreAdapter`], used for tests
//! and the CLI demo harness. Not a production backend.

use serde_json::Value;

use crate::adapter::{Index, Key, StoreAdapter, Table, UpdateOutcome};
use crate::codec::Record;
use crate::config::StorageConfig;
use crate::errors::StoreError;
use crate::memory::table::TableStore;

/// Thread-safe in-memory store backing all five logical tables, one
/// independently-locked [`TableStore`] each.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    config: StorageConfig,
    sessions: TableStore,
    questions: TableStore,
    wrong_entries: TableStore,
    progress: TableStore,
    user_difficulty: TableStore,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    fn table_store(&self, table: Table) -> &TableStore {
        match table {
            Table::Sessions => &self.sessions,
            Table::Questions => &self.questions,
            Table::WrongEntries => &self.wrong_entries,
            Table::Progress => &self.progress,
            Table::UserDifficulty => &self.user_difficulty,
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

fn field_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

fn matches_index(record: &Record, index: Index, partition_key: &str) -> bool {
    match index {
        Index::SessionsByUserStatus => field_str(record, "user_id") == Some(partition_key),
        Index::QuestionsByCategoryLanguage => field_str(record, "category") == Some(partition_key),
        Index::QuestionsByProviderCertificate => {
            field_str(record, "provider") == Some(partition_key)
        }
        Index::WrongEntriesByUserQuestion => field_str(record, "user_id") == Some(partition_key),
        Index::ProgressByQuestionLastAttempt => {
            field_str(record, "question_id") == Some(partition_key)
        }
    }
}

fn sort_field(index: Index) -> &'static str {
    match index {
        Index::SessionsByUserStatus => "status",
        Index::QuestionsByCategoryLanguage => "language",
        Index::QuestionsByProviderCertificate => "certificate",
        Index::WrongEntriesByUserQuestion => "question_id",
        Index::ProgressByQuestionLastAttempt => "last_attempt_at",
    }
}

fn default_partition_field(table: Table) -> &'static str {
    match table {
        Table::Sessions | Table::WrongEntries | Table::Progress | Table::UserDifficulty => {
            "user_id"
        }
        Table::Questions => "category",
    }
}

/// Sort field used by a primary-key range scan (no secondary index given),
/// mirroring each table's documented "sorted by" column.
fn default_sort_field(table: Table) -> &'static str {
    match table {
        Table::Sessions => "updated_at",
        Table::Questions => "question_id",
        Table::WrongEntries => "timestamp",
        Table::Progress => "last_attempt_at",
        Table::UserDifficulty => "user_id",
    }
}

impl StoreAdapter for InMemoryStore {
    fn get(&self, table: Table, key: &Key) -> Result<Option<Record>, StoreError> {
        Ok(self.table_store(table).get(key))
    }

    fn put(&self, table: Table, key: &Key, record: Record) -> Result<(), StoreError> {
        self.table_store(table).put(key, record);
        Ok(())
    }

    fn update_conditional(
        &self,
        table: Table,
        key: &Key,
        expected_version: u64,
        mutation: &dyn Fn(&mut Record),
    ) -> Result<UpdateOutcome, StoreError> {
        self.table_store(table)
            .update_conditional(key, expected_version, mutation)
    }

    fn query(
        &self,
        table: Table,
        partition_key: &str,
        index: Option<Index>,
        limit: Option<usize>,
        ascending: bool,
    ) -> Result<Vec<Record>, StoreError> {
        let store = self.table_store(table);
        let mut matching: Vec<Record> = match index {
            Some(index) => store
                .all()
                .into_iter()
                .filter(|record| matches_index(record, index, partition_key))
                .collect(),
            None => {
                let field = default_partition_field(table);
                store
                    .all()
                    .into_iter()
                    .filter(|record| field_str(record, field) == Some(partition_key))
                    .collect()
            }
        };

        let sort_key: &str = index.map_or_else(|| default_sort_field(table), sort_field);
        matching.sort_by(|a, b| {
            let a_key = field_str(a, sort_key).unwrap_or_default();
            let b_key = field_str(b, sort_key).unwrap_or_default();
            if ascending {
                a_key.cmp(b_key)
            } else {
                b_key.cmp(a_key)
            }
        });

        if let Some(limit) = limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    fn batch_get(&self, table: Table, keys: &[Key]) -> Result<Vec<Option<Record>>, StoreError> {
        let store = self.table_store(table);
        let batch_size = self.config.batch_size.max(1);
        let mut results = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(batch_size) {
            results.extend(store.batch_get(chunk));
        }
        Ok(results)
    }

    fn delete(&self, table: Table, key: &Key) -> Result<(), StoreError> {
        self.table_store(table).delete(key);
        Ok(())
    }
}
