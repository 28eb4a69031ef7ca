//! Error types for entity validation and decoding.

use thiserror::Error;

/// Raised when a persisted record cannot be decoded into a domain entity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field was absent from the record.
    #[error("missing field `{field_path}`")]
    MissingField { field_path: String },
    /// A field held a value of the wrong shape.
    #[error("malformed field `{field_path}`: {reason}")]
    MalformedField { field_path: String, reason: String },
    /// The record's schema version byte is not one this build understands.
    #[error("unknown schema version {version} for `{entity}`")]
    UnknownSchemaVersion { entity: &'static str, version: u8 },
}

/// Raised when an entity fails a domain invariant at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A question's correct-answer set is empty.
    #[error("question {question_id} has an empty correct_set")]
    EmptyCorrectSet { question_id: String },
    /// A question declared fewer than two choices.
    #[error("question {question_id} has fewer than two choices")]
    TooFewChoices { question_id: String },
    /// Two choices on the same question shared a `choice_id`.
    #[error("question {question_id} has duplicate choice id {choice_id}")]
    DuplicateChoiceId {
        question_id: String,
        choice_id: String,
    },
    /// `correct_set` referenced a choice id absent from `choices`.
    #[error("question {question_id} correct_set references unknown choice {choice_id}")]
    UnknownCorrectChoice {
        question_id: String,
        choice_id: String,
    },
}
