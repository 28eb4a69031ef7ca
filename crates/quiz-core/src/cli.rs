//! Terminal-backed presentation adapter for running one quiz session
//! interactively, used by the `cli` binary and available to any caller
//! with its own reader/writer pair.

use std::io::{self, BufRead, BufReader, Write};
use std::time::Instant;

use quiz_domain::{ChoiceId, Session, SessionId, UserId};

use crate::engine::QuizEngine;
use crate::errors::{QuizError, QuizResult};
use crate::resolution::{NextAction, ResolvedAnswer, SubmitAnswerRequest};
use crate::selection::{SelectedQuestion, SelectionOutcome};

/// The presentation seam a CLI (or any other terminal-shaped adapter)
/// implements: show a question, show the graded outcome, show the final
/// summary.
pub trait QuizPort {
    /// Presents `question` and returns the caller's chosen [`ChoiceId`]s.
    ///
    /// # Errors
    /// Returns an I/O error if the prompt can't be written or the reply
    /// can't be read.
    fn present_question(&mut self, question: &SelectedQuestion) -> io::Result<Vec<ChoiceId>>;

    /// Reports a graded submission's outcome.
    ///
    /// # Errors
    /// Returns an I/O error if the feedback can't be written.
    fn publish_feedback(&mut self, resolved: &ResolvedAnswer) -> io::Result<()>;

    /// Reports that `session` has reached `completed`.
    ///
    /// # Errors
    /// Returns an I/O error if the summary can't be written.
    fn present_summary(&mut self, session: &Session) -> io::Result<()>;
}

/// Terminal-backed [`QuizPort`] reading replies from `R` and writing
/// prompts/feedback to `W`.
pub struct TerminalPort<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPort<BufReader<io::Stdin>, io::Stdout> {
    /// Constructs a terminal port using standard input and output streams.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }
}

impl Default for TerminalPort<BufReader<io::Stdin>, io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> TerminalPort<R, W> {
    /// Creates a terminal port from custom reader and writer handles.
    #[must_use]
    pub fn with_io(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consumes the port and returns the underlying I/O handles.
    #[must_use]
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R, W> QuizPort for TerminalPort<R, W>
where
    R: BufRead,
    W: Write,
{
    fn present_question(&mut self, question: &SelectedQuestion) -> io::Result<Vec<ChoiceId>> {
        writeln!(self.writer)?;
        if question.from_wrong_pool {
            writeln!(self.writer, "(from the wrong-answer pool)")?;
        }
        writeln!(self.writer, "{}", question.prompt)?;
        for (index, choice) in question.ordered_choices.iter().enumerate() {
            writeln!(self.writer, "  {}) {}", index + 1, choice.text)?;
        }
        if let Some(remaining) = question.remaining_tries {
            writeln!(self.writer, "Retries remaining after this attempt: {remaining}")?;
        }
        write!(self.writer, "> ")?;
        self.writer.flush()?;

        let mut buffer = String::new();
        self.reader.read_line(&mut buffer)?;

        let selected: Vec<ChoiceId> = buffer
            .split(',')
            .filter_map(|token| {
                let index: usize = token.trim().parse().ok()?;
                question.ordered_choices.get(index.checked_sub(1)?).map(|c| c.choice_id.clone())
            })
            .collect();
        Ok(selected)
    }

    fn publish_feedback(&mut self, resolved: &ResolvedAnswer) -> io::Result<()> {
        if resolved.grade.is_correct() {
            writeln!(self.writer, "Correct!")?;
        } else {
            writeln!(self.writer, "Incorrect.")?;
        }
        if let Some(indicator) = &resolved.penalty_indicator {
            writeln!(self.writer, "{indicator}")?;
        }
        if matches!(resolved.next_action, NextAction::RetrySameQuestion { .. }) {
            writeln!(self.writer, "Try again.")?;
        }
        self.writer.flush()
    }

    fn present_summary(&mut self, session: &Session) -> io::Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Session complete: {} of {} questions ({} first try, {} after a retry)",
            session.progress.cursor,
            session.question_pool.len(),
            session.progress.correct_count,
            session.progress.wrong_count,
        )?;
        writeln!(self.writer, "Time spent: {}s", session.progress.time_spent_s)?;
        self.writer.flush()
    }
}

/// Drives `session_id` to completion against `engine`, presenting each
/// question and its graded outcome through `port`.
///
/// # Errors
/// Propagates any [`QuizError`] raised by the engine.
pub fn run_session(engine: &QuizEngine, session_id: SessionId, user_id: &UserId, port: &mut impl QuizPort) -> QuizResult<()> {
    loop {
        match engine.next_question(session_id, user_id)? {
            SelectionOutcome::SessionComplete => {
                let session = engine.get_session(session_id, user_id)?;
                let _ = port.present_summary(&session);
                return Ok(());
            }
            SelectionOutcome::Next(question) => {
                let started_at = Instant::now();
                let selected = port.present_question(&question).map_err(io_error)?;
                let resolved: ResolvedAnswer = engine.submit_answer(SubmitAnswerRequest {
                    session_id,
                    user_id: user_id.clone(),
                    question_id: question.question_id,
                    selected,
                    time_spent_s: started_at.elapsed().as_secs(),
                })?;
                let _ = port.publish_feedback(&resolved);
            }
        }
    }
}

fn io_error(err: io::Error) -> QuizError {
    QuizError::Corrupted {
        field_path: err.to_string(),
    }
}
