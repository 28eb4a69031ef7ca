//! The `Context` handle injected into every engine operation, and the
//! outbound-event seam observers hang off of.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use quiz_domain::{SessionId, SessionProgress, UserId};
use quiz_scheduler::EngineConfig;
use store_adapter::StoreAdapter;

/// Source of "now", injected so tests never depend on wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock, backed by [`Utc::now`].
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Receiver for the engine's one outbound event, `session_completed`.
/// Delivery is best-effort: [`crate::engine::QuizEngine`] never lets an
/// observer failure affect the session's persisted state.
pub trait SessionObserver: Send + Sync {
    /// Called once a session transitions to `completed`.
    ///
    /// # Errors
    /// Any `Err` is logged by the caller and otherwise ignored.
    fn session_completed(
        &self,
        session_id: SessionId,
        user_id: &UserId,
        progress: &SessionProgress,
    ) -> Result<(), String> {
        let _ = (session_id, user_id, progress);
        Ok(())
    }
}

/// An observer that does nothing, used when no outbound event sink is wired up.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Everything a `quiz-core` operation needs that isn't pure domain logic:
/// the store, the clock, a seeded RNG for shuffling and exploration, the
/// tunable engine configuration, and the outbound-event observer.
pub struct Context {
    pub store: Arc<dyn StoreAdapter>,
    pub clock: Arc<dyn Clock>,
    rng: Mutex<ChaCha8Rng>,
    pub config: EngineConfig,
    pub observer: Arc<dyn SessionObserver>,
}

impl Context {
    /// Builds a context with the system clock, a no-op observer, and an RNG
    /// seeded from `seed` (callers wanting true randomness should seed from
    /// an external entropy source themselves; the engine never reads
    /// `rand::thread_rng()` directly).
    #[must_use]
    pub fn new(store: Arc<dyn StoreAdapter>, seed: u64, config: EngineConfig) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Builds a context pinned to a fixed instant, for deterministic tests.
    #[must_use]
    pub fn for_test(store: Arc<dyn StoreAdapter>, seed: u64, now: DateTime<Utc>) -> Self {
        Self {
            store,
            clock: Arc::new(FixedClock(now)),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            config: EngineConfig::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Runs `draw` against the context's RNG under its internal lock.
    pub fn with_rng<T>(&self, draw: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        draw(&mut self.rng.lock())
    }

    pub fn notify_session_completed(
        &self,
        session_id: SessionId,
        user_id: &UserId,
        progress: &SessionProgress,
    ) {
        if let Err(reason) = self.observer.session_completed(session_id, user_id, progress) {
            tracing::warn!(%session_id, %reason, "session_completed observer failed");
        }
    }
}
