//! Scenario 5 — spaced repetition ordering: among several active wrong-pool
//! entries, the Adaptive Selection Engine serves the one with the highest
//! readiness score, ties broken by the oldest `timestamp`.
//!
//! This lives alongside the selection engine rather than under
//! `quiz-scheduler` because the readiness formula and the max-score pick are
//! both `AdaptiveSelectionEngine` responsibilities (`quiz-scheduler`'s
//! `WrongPoolManager::list_oldest` only supplies the oldest-first candidate
//! set the engine then scores); see DESIGN.md for the full reasoning.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::{Context, SelectionOutcome};
use quiz_domain::{
    Choice, ChoiceId, DeclaredDifficulty, Question, QuestionId, QuestionKind, QuestionStatus,
    SessionConfig, SessionSource, UserId, WrongEntry,
};
use quiz_scheduler::{QuestionCatalog, SessionStateManager, WrongPoolManager};
use store_adapter::{InMemoryStore, StoreAdapter, Encode, Key, Table};

struct MapCatalog(HashMap<QuestionId, Question>);

impl QuestionCatalog for MapCatalog {
    fn query_questions(&self, source: &SessionSource) -> Vec<QuestionId> {
        self.0.keys().take(source.question_count as usize).cloned().collect()
    }

    fn get_question(&self, question_id: &QuestionId) -> Option<Question> {
        self.0.get(question_id).cloned()
    }
}

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-02T00:00:00Z").unwrap().with_timezone(&Utc)
}

fn question(id: &str) -> Question {
    Question {
        question_id: QuestionId::from(id),
        category: "networking".into(),
        provider: "acme".into(),
        certificate: "acme-101".into(),
        language: "en".into(),
        prompt: format!("prompt {id}"),
        kind: QuestionKind::SingleChoice,
        choices: vec![
            Choice { choice_id: ChoiceId::from("c1"), text: "a".into(), is_correct: false },
            Choice { choice_id: ChoiceId::from("c2"), text: "b".into(), is_correct: true },
        ],
        declared_difficulty: DeclaredDifficulty::new(3),
        status: QuestionStatus::Active,
    }
}

fn entry_key(user_id: &UserId, question_id: &QuestionId) -> Key {
    Key::new(&[user_id.as_str(), question_id.as_str()])
}

fn seed_entry(
    store: &dyn StoreAdapter,
    user_id: &UserId,
    question_id: &str,
    hours_ago: i64,
    attempts: usize,
    now: DateTime<Utc>,
) {
    let last_attempt_at = now - chrono::Duration::hours(hours_ago);
    let mut entry = WrongEntry::new(user_id.clone(), QuestionId::from(question_id), quiz_domain::SessionId::new(), 2, None, last_attempt_at);
    for _ in 1..attempts {
        entry.attempts.push(quiz_domain::Attempt { timestamp: last_attempt_at, correct: false });
    }
    store.put(Table::WrongEntries, &entry_key(user_id, &QuestionId::from(question_id)), entry.encode()).unwrap();
}

#[test]
fn highest_readiness_wins_ties_broken_by_oldest_attempt() {
    let store: Arc<dyn StoreAdapter> = Arc::new(InMemoryStore::default());
    let user_id = UserId::from("u1");
    let now = base_time();

    // ages 2h/8h/30h, attempt counts 1/1/2 -> spaced intervals [1,4,24,72]
    // give readiness 2.0/2.0/2.0 (all saturated at the 2.0 cap); the 30h
    // entry's older `timestamp` wins the tie (seeded with `timestamp ==
    // last_attempt_at`, so the age-based ordering and the tiebreak agree).
    seed_entry(store.as_ref(), &user_id, "q_recent", 2, 1, now);
    seed_entry(store.as_ref(), &user_id, "q_medium", 8, 1, now);
    seed_entry(store.as_ref(), &user_id, "q_oldest", 30, 2, now);

    let mut questions = HashMap::new();
    for id in ["q_recent", "q_medium", "q_oldest"] {
        questions.insert(QuestionId::from(id), question(id));
    }
    let catalog = MapCatalog(questions);

    let mut engine_config = quiz_scheduler::EngineConfig::default();
    engine_config.wrong_pool_probability = 1.0;
    let session = SessionStateManager
        .create(
            store.as_ref(),
            &catalog,
            user_id.clone(),
            SessionConfig {
                name: "demo".into(),
                sources: vec![SessionSource {
                    category: None,
                    provider: None,
                    certificate: None,
                    language: None,
                    question_count: 3,
                }],
                settings: std::collections::BTreeMap::new(),
                planned_total: 3,
                estimated_seconds: 600,
            },
            &engine_config,
            now,
        )
        .unwrap();
    SessionStateManager
        .transition_status(store.as_ref(), session.session_id, &user_id, quiz_domain::SessionStatus::Active, 3, now)
        .unwrap();
    let session = SessionStateManager.get(store.as_ref(), session.session_id, &user_id, now).unwrap();

    let mut ctx = Context::for_test(Arc::clone(&store), 1, now);
    ctx.config = engine_config;

    let engine = quiz_core::AdaptiveSelectionEngine;
    let outcome = engine.select(&ctx, &catalog, &session, &user_id).unwrap();
    let SelectionOutcome::Next(selected) = outcome else { panic!("expected a wrong-pool question") };
    assert!(selected.from_wrong_pool);
    assert_eq!(selected.question_id, QuestionId::from("q_oldest"));

    let wrong_pool = WrongPoolManager;
    assert!(wrong_pool
        .lookup_active(store.as_ref(), &user_id, &QuestionId::from("q_oldest"))
        .unwrap()
        .is_some());
}
