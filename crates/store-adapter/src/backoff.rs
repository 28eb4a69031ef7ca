//! Exponential backoff with jitter for transient storage errors.

use rand::Rng;

use crate::config::StorageConfig;
use crate::errors::StoreError;

/// Whether an error represents a transient condition (throttling, connection
/// reset) that is worth retrying, as opposed to a permanent one (not-found,
/// corruption, constraint violation) that must propagate immediately.
#[must_use]
pub fn is_transient(error: &StoreError) -> bool {
    matches!(error, StoreError::StorageUnavailable { .. })
}

/// Delay, in milliseconds, before the `attempt`-th retry (0-indexed),
/// doubling the base delay each attempt and capping at `max_backoff_ms`,
/// then adding up to 10% jitter.
fn backoff_delay_ms(config: &StorageConfig, attempt: u32, rng: &mut impl Rng) -> u64 {
    let exponential = config
        .base_backoff_ms
        .saturating_mul(1u64 << attempt.min(20));
    let capped = exponential.min(config.max_backoff_ms);
    let jitter = rng.gen_range(0..=capped / 10 + 1);
    capped + jitter
}

/// Runs `operation`, retrying up to `config.max_retries` times on a
/// transient error with exponential backoff and jitter. A non-transient
/// error or a successful result short-circuits immediately. `sleep` performs
/// the actual wait (injected so tests never really sleep).
pub fn retry_with_backoff<T>(
    config: &StorageConfig,
    rng: &mut impl Rng,
    mut sleep: impl FnMut(u64),
    mut operation: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let mut attempt = 0u8;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) if is_transient(&error) && attempt + 1 < config.max_retries => {
                let delay = backoff_delay_ms(config, u32::from(attempt), rng);
                tracing::warn!(attempt, delay_ms = delay, "retrying after transient store error");
                sleep(delay);
                attempt += 1;
            }
            Err(error) if is_transient(&error) => {
                return Err(StoreError::StorageUnavailable {
                    attempts: attempt + 1,
                });
            }
            Err(error) => return Err(error),
        }
    }
}
