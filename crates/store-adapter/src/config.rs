//! Runtime configuration for [`crate::adapter::StoreAdapter`] implementations.

/// Runtime configuration for a [`crate::adapter::StoreAdapter`] implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageConfig {
    /// Database connection string when using a networked backend.
    pub dsn: Option<String>,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Number of records processed per batch operation.
    pub batch_size: usize,
    /// Maximum number of attempts (including the first) for a transient failure.
    pub max_retries: u8,
    /// Base delay for exponential backoff between retries, in milliseconds.
    pub base_backoff_ms: u64,
    /// Ceiling on the backoff delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            max_connections: 10,
            batch_size: 100,
            max_retries: 3,
            base_backoff_ms: 50,
            max_backoff_ms: 2_000,
        }
    }
}
