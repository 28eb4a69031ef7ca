//! Demo CLI: runs one quiz session end-to-end against an in-memory
//! catalog and store, for manual smoke testing of the selection and
//! resolution pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use quiz_core::cli::{run_session, TerminalPort};
use quiz_core::{Context, QuizEngine};
use quiz_domain::{Choice, ChoiceId, DeclaredDifficulty, Question, QuestionId, QuestionKind, QuestionStatus, SessionConfig, SessionSource, UserId};
use quiz_scheduler::QuestionCatalog;
use store_adapter::{InMemoryStore, StoreAdapter};
use tracing_subscriber::EnvFilter;

struct DemoCatalog(HashMap<QuestionId, Question>);

impl DemoCatalog {
    fn seeded() -> Self {
        let mut questions = HashMap::new();
        for (id, prompt, correct, wrong) in [
            ("q1", "Which protocol resolves a hostname to an IP address?", "DNS", "ARP"),
            ("q2", "Which layer of the OSI model do routers primarily operate at?", "Network", "Session"),
            ("q3", "Which HTTP status code means \"not found\"?", "404", "200"),
        ] {
            questions.insert(
                QuestionId::from(id),
                Question {
                    question_id: QuestionId::from(id),
                    category: "networking".into(),
                    provider: "demo".into(),
                    certificate: "demo-101".into(),
                    language: "en".into(),
                    prompt: prompt.into(),
                    kind: QuestionKind::SingleChoice,
                    choices: vec![
                        Choice { choice_id: ChoiceId::from("correct"), text: correct.into(), is_correct: true },
                        Choice { choice_id: ChoiceId::from("wrong"), text: wrong.into(), is_correct: false },
                    ],
                    declared_difficulty: DeclaredDifficulty::new(3),
                    status: QuestionStatus::Active,
                },
            );
        }
        Self(questions)
    }
}

impl QuestionCatalog for DemoCatalog {
    fn query_questions(&self, source: &SessionSource) -> Vec<QuestionId> {
        self.0.keys().take(source.question_count as usize).cloned().collect()
    }

    fn get_question(&self, question_id: &QuestionId) -> Option<Question> {
        self.0.get(question_id).cloned()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store: Arc<dyn StoreAdapter> = Arc::new(InMemoryStore::default());
    let catalog: Arc<dyn QuestionCatalog> = Arc::new(DemoCatalog::seeded());
    let ctx = Context::new(store, 0, quiz_scheduler::EngineConfig::default());
    let engine = QuizEngine::new(ctx, catalog);

    let user_id = UserId::from("demo-user");
    let session = engine
        .create_session(
            user_id.clone(),
            SessionConfig {
                name: "demo session".into(),
                sources: vec![SessionSource {
                    category: Some("networking".into()),
                    provider: None,
                    certificate: None,
                    language: None,
                    question_count: 3,
                }],
                settings: std::collections::BTreeMap::new(),
                planned_total: 3,
                estimated_seconds: 300,
            },
        )
        .expect("demo catalog has enough questions to seed a session");

    engine
        .start_session(session.session_id, &user_id)
        .expect("a freshly created session can always start");

    let mut port = TerminalPort::new();
    if let Err(err) = run_session(&engine, session.session_id, &user_id, &mut port) {
        eprintln!("quiz session ended with an error: {err}");
        std::process::exit(1);
    }
}
