//! Session lifecycle: creation against a question catalog, point reads with
//! lazy expiry, and version-guarded atomic advances.

use chrono::{DateTime, Utc};
use store_adapter::{Decode, Encode, Key, StoreAdapter, StoreError, Table, UpdateOutcome};

use quiz_domain::{
    Session, SessionConfig, SessionId, SessionProgress, SessionSource, SessionStatus, UserId,
};

use crate::config::EngineConfig;
use crate::errors::SchedulerError;

/// Read-only view onto the question catalog, queried at session creation to
/// build a session's fixed `question_pool`. The catalog itself — authoring,
/// import, storage — is out of scope; this is the only shape the scheduler
/// needs from it.
pub trait QuestionCatalog: Send + Sync {
    /// Returns up to `limit` question ids matching `source`, in unspecified
    /// order; callers must not depend on ordering beyond post-filtering.
    fn query_questions(&self, source: &SessionSource) -> Vec<quiz_domain::QuestionId>;

    /// Fetches a single question's content, or `None` if it is absent or no
    /// longer in the catalog.
    fn get_question(&self, question_id: &quiz_domain::QuestionId) -> Option<quiz_domain::Question>;
}

fn session_key(session_id: SessionId) -> Key {
    let id = session_id.to_string();
    Key::new(&[id.as_str()])
}

/// Applies the lazy-expiry rule: a session past `expires_at` that hasn't
/// reached a terminal status reads back as `expired`, whether or not that
/// has been written back yet.
fn with_lazy_expiry(mut session: Session, now: DateTime<Utc>) -> Session {
    if session.has_lapsed(now) {
        session.status = SessionStatus::Expired;
    }
    session
}

fn decode_session(record: &store_adapter::Record) -> Result<Session, SchedulerError> {
    Session::decode(record).map_err(|err| {
        SchedulerError::Store(StoreError::Corrupted {
            field_path: err.to_string(),
        })
    })
}

/// Owns session creation, reads, and atomic mutation through the store's
/// conditional-update primitive.
#[derive(Debug, Default)]
pub struct SessionStateManager;

impl SessionStateManager {
    /// Validates `config`, builds `question_pool` from `catalog`, and
    /// persists the initial `created` state.
    ///
    /// # Errors
    /// Returns [`SchedulerError::InvalidSessionConfig`] if `config` itself is
    /// malformed (empty name, empty/oversized `sources`, a zero
    /// `question_count`, or `planned_total` over the configured ceiling),
    /// [`SchedulerError::InsufficientQuestions`] if the catalog cannot supply
    /// as many questions as requested, or [`SchedulerError::Store`] on a
    /// transport failure.
    pub fn create(
        &self,
        store: &dyn StoreAdapter,
        catalog: &dyn QuestionCatalog,
        user_id: UserId,
        config: SessionConfig,
        engine_config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<Session, SchedulerError> {
        if config.name.trim().is_empty() {
            return Err(SchedulerError::InvalidSessionConfig {
                reason: "name must not be empty".to_string(),
            });
        }
        if config.sources.is_empty() || config.sources.len() > 10 {
            return Err(SchedulerError::InvalidSessionConfig {
                reason: format!("sources must be non-empty and at most 10, got {}", config.sources.len()),
            });
        }
        if let Some(source) = config.sources.iter().find(|source| source.question_count == 0) {
            return Err(SchedulerError::InvalidSessionConfig {
                reason: format!("source {source:?} has question_count 0"),
            });
        }
        if config.planned_total > engine_config.session_max_questions {
            return Err(SchedulerError::InvalidSessionConfig {
                reason: format!(
                    "planned_total {} exceeds session_max_questions {}",
                    config.planned_total, engine_config.session_max_questions
                ),
            });
        }

        let mut question_pool = Vec::new();
        for source in &config.sources {
            let mut found = catalog.query_questions(source);
            found.truncate(source.question_count as usize);
            if found.len() < source.question_count as usize {
                return Err(SchedulerError::InsufficientQuestions {
                    requested: source.question_count,
                    available: found.len() as u32,
                });
            }
            question_pool.extend(found);
        }

        let session_id = SessionId::new();
        let session = Session {
            session_id,
            user_id,
            config,
            question_pool,
            progress: SessionProgress::default(),
            status: SessionStatus::Created,
            version: 0,
            created_at: now,
            updated_at: now,
            expires_at: now + chrono::Duration::seconds(i64::from(engine_config.session_default_duration_s)),
        };
        store.put(Table::Sessions, &session_key(session_id), session.encode())?;
        Ok(session)
    }

    /// Point-reads a session, applying lazy expiry, and verifying it belongs
    /// to `user_id`.
    ///
    /// # Errors
    /// Returns [`SchedulerError::SessionNotFound`] if no session exists
    /// under `session_id`, or exists under a different user, or
    /// [`SchedulerError::Store`] on a transport/decode failure.
    pub fn get(
        &self,
        store: &dyn StoreAdapter,
        session_id: SessionId,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Session, SchedulerError> {
        let record = store.get(Table::Sessions, &session_key(session_id))?.ok_or_else(|| {
            SchedulerError::SessionNotFound {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
            }
        })?;
        let session = decode_session(&record)?;
        if session.user_id != *user_id {
            return Err(SchedulerError::SessionNotFound {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(with_lazy_expiry(session, now))
    }

    /// Applies `mutate` to the session identified by `(session_id, user_id)`
    /// through the store's version-guarded compare-and-set, re-reading and
    /// retrying up to `retry_attempts` times on conflict.
    ///
    /// `mutate` must be idempotent under replay: it may run more than once
    /// against progressively fresher reads before a write finally succeeds.
    ///
    /// # Errors
    /// Returns [`SchedulerError::SessionNotFound`] if the session is
    /// missing or owned by a different user, [`SchedulerError::Concurrent`]
    /// once retries are exhausted, or a propagated error from `mutate`.
    pub fn advance(
        &self,
        store: &dyn StoreAdapter,
        session_id: SessionId,
        user_id: &UserId,
        retry_attempts: u8,
        now: DateTime<Utc>,
        mutate: impl Fn(&mut Session) -> Result<(), SchedulerError>,
    ) -> Result<Session, SchedulerError> {
        let key = session_key(session_id);
        for attempt in 0..retry_attempts.max(1) {
            let current = self.get(store, session_id, user_id, now)?;
            let expected_version = current.version;
            let mut next = current;
            mutate(&mut next)?;
            next.updated_at = now;

            let outcome = store.update_conditional(Table::Sessions, &key, expected_version, &|record| {
                *record = next.encode();
            })?;
            match outcome {
                UpdateOutcome::Applied { new_version } => {
                    next.version = new_version;
                    return Ok(next);
                }
                UpdateOutcome::Conflict => {
                    tracing::warn!(attempt, %session_id, "session advance conflicted, retrying");
                    continue;
                }
            }
        }
        Err(SchedulerError::Concurrent {
            attempts: retry_attempts,
        })
    }

    /// Convenience wrapper over [`Self::advance`] for a bare status
    /// transition, validated against [`SessionStatus::can_transition_to`]
    /// before the conditional write is attempted.
    ///
    /// # Errors
    /// Returns [`SchedulerError::InvalidTransition`] if the transition is
    /// not permitted from the session's current status, or any error
    /// [`Self::advance`] can return.
    pub fn transition_status(
        &self,
        store: &dyn StoreAdapter,
        session_id: SessionId,
        user_id: &UserId,
        next_status: SessionStatus,
        retry_attempts: u8,
        now: DateTime<Utc>,
    ) -> Result<Session, SchedulerError> {
        self.advance(store, session_id, user_id, retry_attempts, now, |session| {
            session.transition_to(next_status).map_err(|err| SchedulerError::InvalidTransition {
                from: format!("{:?}", err.from),
                to: format!("{:?}", err.to),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_domain::QuestionId;
    use std::collections::BTreeMap;
    use store_adapter::InMemoryStore;

    struct FixedCatalog;

    impl QuestionCatalog for FixedCatalog {
        fn query_questions(&self, source: &SessionSource) -> Vec<QuestionId> {
            (0..source.question_count)
                .map(|i| QuestionId::from(format!("q{i}")))
                .collect()
        }

        fn get_question(&self, _question_id: &QuestionId) -> Option<quiz_domain::Question> {
            None
        }
    }

    /// A catalog that can only ever supply 2 questions, regardless of request size.
    struct SparseCatalog;

    impl QuestionCatalog for SparseCatalog {
        fn query_questions(&self, _source: &SessionSource) -> Vec<QuestionId> {
            vec![QuestionId::from("q0"), QuestionId::from("q1")]
        }

        fn get_question(&self, _question_id: &QuestionId) -> Option<quiz_domain::Question> {
            None
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn config(planned_total: u32) -> SessionConfig {
        SessionConfig {
            name: "demo".into(),
            sources: vec![SessionSource {
                category: Some("networking".into()),
                provider: None,
                certificate: None,
                language: None,
                question_count: planned_total,
            }],
            settings: BTreeMap::new(),
            planned_total,
            estimated_seconds: 600,
        }
    }

    #[test]
    fn create_builds_pool_and_persists_created_session() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let session = manager
            .create(
                &store,
                &FixedCatalog,
                UserId::from("u1"),
                config(3),
                &EngineConfig::default(),
                now(),
            )
            .unwrap();
        assert_eq!(session.question_pool.len(), 3);
        assert_eq!(session.status, SessionStatus::Created);
        assert_eq!(session.version, 0);
    }

    #[test]
    fn create_rejects_empty_name() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let mut bad_config = config(3);
        bad_config.name = String::new();
        let err = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), bad_config, &EngineConfig::default(), now())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidSessionConfig { .. }));
    }

    #[test]
    fn create_rejects_a_zero_question_count_source() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let mut bad_config = config(3);
        bad_config.sources[0].question_count = 0;
        let err = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), bad_config, &EngineConfig::default(), now())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidSessionConfig { .. }));
    }

    #[test]
    fn create_reports_insufficient_questions_separately_from_invalid_config() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let short_config = config(5);
        let err = manager
            .create(&store, &SparseCatalog, UserId::from("u1"), short_config, &EngineConfig::default(), now())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InsufficientQuestions { .. }));
    }

    #[test]
    fn get_returns_not_found_for_mismatched_user() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let session = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), config(1), &EngineConfig::default(), now())
            .unwrap();
        let err = manager
            .get(&store, session.session_id, &UserId::from("u2"), now())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::SessionNotFound { .. }));
    }

    #[test]
    fn get_applies_lazy_expiry() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let session = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), config(1), &EngineConfig::default(), now())
            .unwrap();
        let much_later = session.expires_at + chrono::Duration::seconds(1);
        let fetched = manager.get(&store, session.session_id, &UserId::from("u1"), much_later).unwrap();
        assert_eq!(fetched.status, SessionStatus::Expired);
    }

    #[test]
    fn transition_status_persists_through_conditional_update() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let session = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), config(1), &EngineConfig::default(), now())
            .unwrap();
        let advanced = manager
            .transition_status(&store, session.session_id, &UserId::from("u1"), SessionStatus::Active, 3, now())
            .unwrap();
        assert_eq!(advanced.status, SessionStatus::Active);
        assert_eq!(advanced.version, 1);
    }

    #[test]
    fn transition_status_rejects_illegal_transition() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let session = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), config(1), &EngineConfig::default(), now())
            .unwrap();
        let err = manager
            .transition_status(&store, session.session_id, &UserId::from("u1"), SessionStatus::Completed, 3, now())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidTransition { .. }));
    }

    #[test]
    fn advance_mutates_progress_and_bumps_version() {
        let store = InMemoryStore::default();
        let manager = SessionStateManager;
        let session = manager
            .create(&store, &FixedCatalog, UserId::from("u1"), config(2), &EngineConfig::default(), now())
            .unwrap();
        let advanced = manager
            .advance(&store, session.session_id, &UserId::from("u1"), 3, now(), |session| {
                session.progress.cursor += 1;
                session.progress.correct_count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(advanced.progress.cursor, 1);
        assert_eq!(advanced.version, 1);
    }
}
