//! Quiz session state machine.
//!
//! Each question has one answer slot moving from `Unanswered` to a terminal
//! `Correct` or `Incorrect` state. [`QuizSession::submit`] is the only
//! transition and the only writer of the score; a slot is never answered
//! twice. Whether the whole quiz is finished is derived from the slots.

use std::sync::Arc;

use serde::Serialize;

use crate::error::SessionError;
use crate::model::{AnswerSpec, ExamSet, QuestionRecord, Selection};

/// Outcome shown to the user after answering a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: bool,
    /// The recorded correct answer, shown even when the answer was right.
    pub correct_answer: AnswerSpec,
    pub explanation: String,
}

/// Per-question answer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnswerSlot {
    #[default]
    Unanswered,
    Answered {
        selection: Selection,
        feedback: Feedback,
    },
}

impl AnswerSlot {
    pub fn is_answered(&self) -> bool {
        matches!(self, AnswerSlot::Answered { .. })
    }

    pub fn submitted(&self) -> Option<&Selection> {
        match self {
            AnswerSlot::Answered { selection, .. } => Some(selection),
            AnswerSlot::Unanswered => None,
        }
    }

    pub fn status(&self) -> SlotStatus {
        match self {
            AnswerSlot::Unanswered => SlotStatus::Unanswered,
            AnswerSlot::Answered { feedback, .. } if feedback.correct => SlotStatus::Correct,
            AnswerSlot::Answered { .. } => SlotStatus::Incorrect,
        }
    }
}

/// Flattened view of an [`AnswerSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Unanswered,
    Correct,
    Incorrect,
}

/// Score out of the number of questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub score: usize,
    pub total: usize,
}

impl ScoreSummary {
    /// Share of correct answers in percent; 0 for an empty exam.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 * 100.0 / self.total as f64
        }
    }
}

/// An interactive run over one exam.
///
/// The exam is shared read-only; the slots and the score belong to the
/// session. Call [`QuizSession::reset`] whenever a new exam replaces the old
/// one so no answers leak between exams.
#[derive(Debug, Clone)]
pub struct QuizSession {
    exam: Arc<ExamSet>,
    slots: Vec<AnswerSlot>,
    score: usize,
}

impl QuizSession {
    pub fn new(exam: Arc<ExamSet>) -> Self {
        let slots = vec![AnswerSlot::Unanswered; exam.len()];
        Self {
            exam,
            slots,
            score: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&QuestionRecord> {
        self.exam.get(index)
    }

    pub fn slot(&self, index: usize) -> Option<&AnswerSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[AnswerSlot] {
        &self.slots
    }

    pub fn status(&self, index: usize) -> Option<SlotStatus> {
        self.slots.get(index).map(AnswerSlot::status)
    }

    /// Number of correct submissions so far.
    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_answered()).count()
    }

    /// True when every slot has been answered.
    pub fn all_answered(&self) -> bool {
        self.slots.iter().all(AnswerSlot::is_answered)
    }

    /// Index of the first question still waiting for an answer.
    pub fn next_unanswered(&self) -> Option<usize> {
        self.slots.iter().position(|s| !s.is_answered())
    }

    /// Current score out of the exam size, finished or not.
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score: self.score,
            total: self.slots.len(),
        }
    }

    /// The final score, available once every question is answered.
    pub fn final_summary(&self) -> Option<ScoreSummary> {
        self.all_answered().then(|| self.summary())
    }

    /// Answer question `index`.
    ///
    /// Rejected submissions leave the session untouched: the slot stays
    /// `Unanswered` and can still be answered.
    pub fn submit(&mut self, index: usize, selection: Selection) -> Result<Feedback, SessionError> {
        let len = self.slots.len();
        let question = self
            .exam
            .get(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })?;

        if self.slots[index].is_answered() {
            return Err(SessionError::AlreadyAnswered(index));
        }

        let expected = question.selection_mode();
        if selection.mode() != expected {
            return Err(SessionError::SelectionMismatch { index, expected });
        }

        if let Some(unknown) = selection.choices().into_iter().find(|c| !question.has_choice(c)) {
            return Err(SessionError::UnknownChoice {
                index,
                choice: unknown.to_string(),
            });
        }

        let correct = question.answer_spec.is_satisfied_by(&selection);
        let feedback = Feedback {
            correct,
            correct_answer: question.answer_spec.clone(),
            explanation: question.explanation.clone(),
        };
        if correct {
            self.score += 1;
        }
        tracing::debug!(index, correct, score = self.score, "answer submitted");

        self.slots[index] = AnswerSlot::Answered {
            selection,
            feedback: feedback.clone(),
        };
        Ok(feedback)
    }

    /// Start over with `exam`, discarding every answer and the score.
    pub fn reset(&mut self, exam: Arc<ExamSet>) {
        self.slots = vec![AnswerSlot::Unanswered; exam.len()];
        self.exam = exam;
        self.score = 0;
    }
}
