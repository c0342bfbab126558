//! Core data model types for examforge.
//!
//! These are the types the whole system shares: the question records the
//! generation service produces, the capped exam set built from them, and the
//! closed set of models the service may be asked to use.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Hard upper bound on the number of questions in one exam.
pub const MAX_EXAM_QUESTIONS: usize = 20;

/// The correct answer(s) of a question.
///
/// On the wire a JSON string is `Single` and a JSON array is `Multiple`, even
/// when the array holds one element. The tag is resolved once when a record is
/// parsed and never re-inspected afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerSpec {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl AnswerSpec {
    /// Which input control the presentation layer should offer.
    pub fn selection_mode(&self) -> SelectionMode {
        match self {
            AnswerSpec::Single(_) => SelectionMode::Single,
            AnswerSpec::Multiple(_) => SelectionMode::Multiple,
        }
    }

    /// All choices named by this spec.
    pub fn choices(&self) -> Vec<&str> {
        match self {
            AnswerSpec::Single(choice) => vec![choice.as_str()],
            AnswerSpec::Multiple(set) => set.iter().map(String::as_str).collect(),
        }
    }

    /// Whether `selection` is exactly the correct answer.
    ///
    /// Multi-select questions require the identical set: no partial credit.
    pub fn is_satisfied_by(&self, selection: &Selection) -> bool {
        match (self, selection) {
            (AnswerSpec::Single(expected), Selection::Single(given)) => expected == given,
            (AnswerSpec::Multiple(expected), Selection::Multiple(given)) => expected == given,
            _ => false,
        }
    }
}

impl fmt::Display for AnswerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.choices().join(", "))
    }
}

/// Single- or multi-select, derived from an [`AnswerSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    Multiple,
}

impl SelectionMode {
    /// Instruction shown next to the choices.
    pub fn hint(&self) -> &'static str {
        match self {
            SelectionMode::Single => "select one",
            SelectionMode::Multiple => "select all that apply",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Single => write!(f, "single"),
            SelectionMode::Multiple => write!(f, "multiple"),
        }
    }
}

/// What a user submitted for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl Selection {
    /// Build a multi-select submission from any iterator of choices.
    pub fn multiple<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Multiple(choices.into_iter().map(Into::into).collect())
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Selection::Single(_) => SelectionMode::Single,
            Selection::Multiple(_) => SelectionMode::Multiple,
        }
    }

    pub fn choices(&self) -> Vec<&str> {
        match self {
            Selection::Single(choice) => vec![choice.as_str()],
            Selection::Multiple(set) => set.iter().map(String::as_str).collect(),
        }
    }
}

/// One multiple-choice question.
///
/// Field names on the wire follow the generation service's JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// The question text.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer options, in presentation order.
    pub choices: Vec<String>,
    /// The correct answer(s).
    #[serde(rename = "correct_answer")]
    pub answer_spec: AnswerSpec,
    /// Why the correct answer is correct.
    pub explanation: String,
}

impl QuestionRecord {
    /// Check the structural invariants of a record.
    ///
    /// Choices must be non-empty and unique, and every choice referenced by
    /// the answer spec must be one of them.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.choices.is_empty() {
            return Err(RecordError::NoChoices);
        }

        let mut seen = HashSet::new();
        for choice in &self.choices {
            if !seen.insert(choice.as_str()) {
                return Err(RecordError::DuplicateChoice(choice.clone()));
            }
        }

        if let AnswerSpec::Multiple(set) = &self.answer_spec {
            if set.is_empty() {
                return Err(RecordError::EmptyAnswer);
            }
        }

        for answer in self.answer_spec.choices() {
            if !seen.contains(answer) {
                return Err(RecordError::UnknownAnswer(answer.to_string()));
            }
        }

        Ok(())
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.answer_spec.selection_mode()
    }

    pub fn has_choice(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }
}

/// The exam set could not be built from the given questions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExamSetError {
    #[error("exam has {0} questions, at most {max} are allowed", max = MAX_EXAM_QUESTIONS)]
    TooManyQuestions(usize),

    #[error("question {index}: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: RecordError,
    },
}

/// The capped, ordered list of questions produced by one generation run.
///
/// Immutable once built. Deserialization re-checks the size bound and every
/// record invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExamSetRepr")]
pub struct ExamSet {
    questions: Vec<QuestionRecord>,
}

#[derive(Deserialize)]
struct ExamSetRepr {
    questions: Vec<QuestionRecord>,
}

impl TryFrom<ExamSetRepr> for ExamSet {
    type Error = ExamSetError;

    fn try_from(repr: ExamSetRepr) -> Result<Self, Self::Error> {
        ExamSet::new(repr.questions)
    }
}

impl ExamSet {
    /// Build an exam set, validating the size bound and each record.
    pub fn new(questions: Vec<QuestionRecord>) -> Result<Self, ExamSetError> {
        if questions.len() > MAX_EXAM_QUESTIONS {
            return Err(ExamSetError::TooManyQuestions(questions.len()));
        }
        for (index, question) in questions.iter().enumerate() {
            question
                .validate()
                .map_err(|source| ExamSetError::InvalidQuestion { index, source })?;
        }
        Ok(Self { questions })
    }

    /// Records already validated by the parser, already capped by the pipeline.
    pub(crate) fn from_validated(questions: Vec<QuestionRecord>) -> Self {
        debug_assert!(questions.len() <= MAX_EXAM_QUESTIONS);
        Self { questions }
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionRecord> {
        self.questions.iter()
    }

    /// Save the exam as JSON to a file.
    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize exam")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write exam to {}", path.display()))?;
        Ok(())
    }

    /// Load an exam from a JSON file.
    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read exam from {}", path.display()))?;
        let exam: ExamSet = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse exam JSON: {}", path.display()))?;
        Ok(exam)
    }
}

impl<'a> IntoIterator for &'a ExamSet {
    type Item = &'a QuestionRecord;
    type IntoIter = std::slice::Iter<'a, QuestionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

/// Models the generation service may be asked to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    #[serde(rename = "gpt-4.1-nano")]
    Gpt41Nano,
}

impl Model {
    pub const ALL: [Model; 5] = [
        Model::Gpt4oMini,
        Model::Gpt4o,
        Model::Gpt41,
        Model::Gpt41Mini,
        Model::Gpt41Nano,
    ];

    /// Identifier sent to the service.
    pub fn id(&self) -> &'static str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt41 => "gpt-4.1",
            Model::Gpt41Mini => "gpt-4.1-mini",
            Model::Gpt41Nano => "gpt-4.1-nano",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Model::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Model::ALL.iter().map(Model::id).collect();
                format!("unknown model: {s} (expected one of: {})", known.join(", "))
            })
    }
}
