//! Exact-set grading of submitted answers.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::ids::ChoiceId;
use crate::question::Question;

/// Outcome of grading a single answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerGrade {
    Correct,
    Incorrect,
}

impl AnswerGrade {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Raised when a submission cannot be graded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradeError {
    /// The caller submitted no selected choices.
    #[error("selected choice set must not be empty")]
    EmptySelection,
}

/// Grades `selected` against `question`'s correct set.
///
/// Per the data model, the answer is correct iff the submitted set equals
/// the question's correct set exactly (duplicates in `selected` are
/// deduplicated first; order never matters). An empty `selected` is
/// rejected as invalid input rather than graded.
///
/// # Errors
/// Returns [`GradeError::EmptySelection`] if `selected` is empty.
pub fn grade_answer(question: &Question, selected: &[ChoiceId]) -> Result<AnswerGrade, GradeError> {
    if selected.is_empty() {
        return Err(GradeError::EmptySelection);
    }

    let deduped: BTreeSet<ChoiceId> = selected.iter().cloned().collect();
    let correct_set = question.correct_set();

    if deduped == correct_set {
        Ok(AnswerGrade::Correct)
    } else {
        Ok(AnswerGrade::Incorrect)
    }
}
