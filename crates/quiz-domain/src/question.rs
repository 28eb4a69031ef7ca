//! Immutable question content owned by the external content catalog.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::ids::{ChoiceId, QuestionId};

/// A single answer option presented alongside a question's prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub choice_id: ChoiceId,
    pub text: String,
    pub is_correct: bool,
}

/// The interaction shape of a question's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

/// Lifecycle state of a question within the content catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Draft,
    Active,
    Deprecated,
    Flagged,
}

/// Author-declared difficulty on a 1-5 scale, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclaredDifficulty(u8);

impl DeclaredDifficulty {
    /// Builds a declared difficulty, clamping into the documented 1-5 range.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 5))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Maps the 1-5 author scale linearly onto the engine's `[0.1, 0.9]` target-difficulty scale.
    #[must_use]
    pub fn to_target_scale(self) -> f64 {
        // 1 -> 0.1, 5 -> 0.9, linear in between.
        0.1 + (f64::from(self.0 - 1) / 4.0) * 0.8
    }
}

/// Immutable question content: classification, prompt, choices, and the
/// answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: QuestionId,
    pub category: String,
    pub provider: String,
    pub certificate: String,
    pub language: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub choices: Vec<Choice>,
    pub declared_difficulty: DeclaredDifficulty,
    pub status: QuestionStatus,
}

impl Question {
    /// Validates the cross-field invariants from the data model: at least two
    /// choices, unique choice ids, and a non-empty correct set contained
    /// within those choices.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] describing the violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.choices.len() < 2 {
            return Err(ValidationError::TooFewChoices {
                question_id: self.question_id.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for choice in &self.choices {
            if !seen.insert(choice.choice_id.as_str()) {
                return Err(ValidationError::DuplicateChoiceId {
                    question_id: self.question_id.to_string(),
                    choice_id: choice.choice_id.to_string(),
                });
            }
        }

        let correct_set = self.correct_set();
        if correct_set.is_empty() {
            return Err(ValidationError::EmptyCorrectSet {
                question_id: self.question_id.to_string(),
            });
        }

        for choice_id in &correct_set {
            if !seen.contains(choice_id.as_str()) {
                return Err(ValidationError::UnknownCorrectChoice {
                    question_id: self.question_id.to_string(),
                    choice_id: choice_id.to_string(),
                });
            }
        }

        Ok(())
    }

    /// The set of choice ids marked `is_correct`.
    #[must_use]
    pub fn correct_set(&self) -> BTreeSet<ChoiceId> {
        self.choices
            .iter()
            .filter(|choice| choice.is_correct)
            .map(|choice| choice.choice_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(id: &str, correct: bool) -> Choice {
        Choice {
            choice_id: ChoiceId::from(id),
            text: format!("choice {id}"),
            is_correct: correct,
        }
    }

    fn sample_question() -> Question {
        Question {
            question_id: QuestionId::from("q1"),
            category: "networking".into(),
            provider: "acme".into(),
            certificate: "acme-101".into(),
            language: "en".into(),
            prompt: "Pick the correct one".into(),
            kind: QuestionKind::SingleChoice,
            choices: vec![choice("c1", false), choice("c2", true)],
            declared_difficulty: DeclaredDifficulty::new(3),
            status: QuestionStatus::Active,
        }
    }

    #[test]
    fn validate_accepts_well_formed_question() {
        assert!(sample_question().validate().is_ok());
    }

    #[test]
    fn validate_rejects_single_choice() {
        let mut question = sample_question();
        question.choices.truncate(1);
        assert!(matches!(
            question.validate(),
            Err(ValidationError::TooFewChoices { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_choice_ids() {
        let mut question = sample_question();
        question.choices.push(choice("c2", false));
        assert!(matches!(
            question.validate(),
            Err(ValidationError::DuplicateChoiceId { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_correct_set() {
        let mut question = sample_question();
        for choice in &mut question.choices {
            choice.is_correct = false;
        }
        assert!(matches!(
            question.validate(),
            Err(ValidationError::EmptyCorrectSet { .. })
        ));
    }

    #[test]
    fn declared_difficulty_clamps_and_scales() {
        assert_eq!(DeclaredDifficulty::new(0).get(), 1);
        assert_eq!(DeclaredDifficulty::new(9).get(), 5);
        assert!((DeclaredDifficulty::new(1).to_target_scale() - 0.1).abs() < 1e-9);
        assert!((DeclaredDifficulty::new(5).to_target_scale() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn correct_set_contains_only_correct_choices() {
        let question = sample_question();
        let correct = question.correct_set();
        assert_eq!(correct.len(), 1);
        assert!(correct.contains(&ChoiceId::from("c2")));
    }
}
