//! Property tests for grading determinism and choice-ordering invariants.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use quiz_core::{Context, SelectionOutcome};
use quiz_domain::{
    grade_answer, Choice, ChoiceId, DeclaredDifficulty, Question, QuestionId, QuestionKind,
    QuestionStatus, Session, SessionConfig, SessionId, SessionProgress, SessionSource,
    SessionStatus, UserId,
};
use quiz_scheduler::QuestionCatalog;
use store_adapter::{InMemoryStore, StoreAdapter};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
}

fn question_with_choices(correct_indices: &BTreeSet<usize>, choice_count: usize) -> Question {
    let choices = (0..choice_count)
        .map(|i| Choice {
            choice_id: ChoiceId::from(format!("c{i}")),
            text: format!("choice {i}"),
            is_correct: correct_indices.contains(&i),
        })
        .collect();
    Question {
        question_id: QuestionId::from("q1"),
        category: "networking".into(),
        provider: "acme".into(),
        certificate: "acme-101".into(),
        language: "en".into(),
        prompt: "prompt".into(),
        kind: QuestionKind::SingleChoice,
        choices,
        declared_difficulty: DeclaredDifficulty::new(3),
        status: QuestionStatus::Active,
    }
}

/// Strategy for a question with `choice_count` choices, 1..choice_count of
/// which are correct, plus a permutation of the full id set as a submission.
fn question_and_submission_strategy() -> impl Strategy<Value = (Question, Vec<ChoiceId>)> {
    (2usize..6).prop_flat_map(|choice_count| {
        proptest::collection::btree_set(0..choice_count, 1..=choice_count).prop_flat_map(move |correct| {
            let question = question_with_choices(&correct, choice_count);
            let ids: Vec<ChoiceId> = question.choices.iter().map(|c| c.choice_id.clone()).collect();
            Just((question, ids)).prop_flat_map(|(question, ids)| {
                proptest::sample::subsequence(ids, 1..=choice_count.max(1))
                    .prop_map(move |picked| (question.clone(), picked))
            })
        })
    })
}

proptest! {
    /// Grading a submission is independent of the order the caller lists
    /// choice ids in.
    #[test]
    fn grade_answer_is_order_independent((question, submitted) in question_and_submission_strategy()) {
        let forward = grade_answer(&question, &submitted).unwrap();
        let mut reversed = submitted.clone();
        reversed.reverse();
        let backward = grade_answer(&question, &reversed).unwrap();
        prop_assert_eq!(forward.is_correct(), backward.is_correct());
    }

    /// Grading a submission is independent of duplicate entries in the
    /// submitted set.
    #[test]
    fn grade_answer_ignores_duplicates((question, submitted) in question_and_submission_strategy()) {
        let once = grade_answer(&question, &submitted).unwrap();
        let mut doubled = submitted.clone();
        doubled.extend(submitted.clone());
        let twice = grade_answer(&question, &doubled).unwrap();
        prop_assert_eq!(once.is_correct(), twice.is_correct());
    }

    /// Submitting exactly the correct-choice set always grades correct;
    /// submitting a strict subset or superset of it never does.
    #[test]
    fn grade_answer_matches_the_exact_correct_set(choice_count in 2usize..6, correct in proptest::collection::btree_set(0usize..6, 1..6)) {
        let correct: BTreeSet<usize> = correct.into_iter().filter(|i| *i < choice_count).collect();
        prop_assume!(!correct.is_empty());
        let question = question_with_choices(&correct, choice_count);
        let exact: Vec<ChoiceId> = correct.iter().map(|i| ChoiceId::from(format!("c{i}"))).collect();
        let grade = grade_answer(&question, &exact).unwrap();
        prop_assert!(grade.is_correct());

        if correct.len() < choice_count {
            let extra = (0..choice_count).find(|i| !correct.contains(i)).unwrap();
            let mut superset = exact.clone();
            superset.push(ChoiceId::from(format!("c{extra}")));
            let grade = grade_answer(&question, &superset).unwrap();
            prop_assert!(!grade.is_correct());
        }
    }
}

fn engine_with(questions: Vec<Question>, seed: u64) -> (quiz_core::AdaptiveSelectionEngine, Context, MapCatalog) {
    let store: Arc<dyn StoreAdapter> = Arc::new(InMemoryStore::default());
    let mut by_id = HashMap::new();
    for question in questions {
        by_id.insert(question.question_id.clone(), question);
    }
    let ctx = Context::for_test(store, seed, now());
    (quiz_core::AdaptiveSelectionEngine, ctx, MapCatalog(by_id))
}

struct MapCatalog(HashMap<QuestionId, Question>);

impl QuestionCatalog for MapCatalog {
    fn query_questions(&self, source: &SessionSource) -> Vec<QuestionId> {
        self.0.keys().take(source.question_count as usize).cloned().collect()
    }

    fn get_question(&self, question_id: &QuestionId) -> Option<Question> {
        self.0.get(question_id).cloned()
    }
}

fn sample_session(pool: Vec<&str>) -> Session {
    Session {
        session_id: SessionId::new(),
        user_id: UserId::from("u1"),
        config: SessionConfig {
            name: "demo".into(),
            sources: vec![],
            settings: std::collections::BTreeMap::new(),
            planned_total: pool.len() as u32,
            estimated_seconds: 600,
        },
        question_pool: pool.into_iter().map(QuestionId::from).collect(),
        progress: SessionProgress::default(),
        status: SessionStatus::Active,
        version: 0,
        created_at: now(),
        updated_at: now(),
        expires_at: now() + chrono::Duration::seconds(3600),
    }
}

proptest! {
    /// The choices handed back for presentation are always a permutation of
    /// the underlying question's choice set, never a subset or a relabeling.
    #[test]
    fn selected_choices_are_a_permutation_of_the_question(choice_count in 2usize..6, seed in 0u64..1000) {
        let question = question_with_choices(&BTreeSet::from([0]), choice_count);
        let original: BTreeSet<String> = question.choices.iter().map(|c| c.choice_id.to_string()).collect();
        let (engine, ctx, catalog) = engine_with(vec![question], seed);
        let session = sample_session(vec!["q1"]);

        let outcome = engine.select(&ctx, &catalog, &session, &UserId::from("u1")).unwrap();
        let SelectionOutcome::Next(selected) = outcome else {
            panic!("expected a question for an unanswered pool");
        };
        let returned: BTreeSet<String> = selected.ordered_choices.iter().map(|c| c.choice_id.to_string()).collect();
        prop_assert_eq!(returned.len(), selected.ordered_choices.len());
        prop_assert_eq!(returned, original);
    }
}
