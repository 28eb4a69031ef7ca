//! Ties [`quiz_scheduler`]'s session lifecycle and wrong-pool bookkeeping
//! into the two operations a caller actually drives: picking the next
//! question and resolving an answer.

pub mod engine;
pub mod errors;
pub mod ports;
pub mod resolution;
pub mod selection;

pub use engine::QuizEngine;
pub use errors::{QuizError, QuizResult};
pub use ports::{Clock, Context, SessionObserver};
pub use resolution::{AnswerResolutionStateMachine, NextAction, ResolvedAnswer, SubmitAnswerRequest};
pub use selection::{AdaptiveSelectionEngine, SelectedQuestion, SelectionOutcome};

#[cfg(feature = "cli")]
pub mod cli;
