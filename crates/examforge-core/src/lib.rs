//! examforge-core: Exam generation pipeline, data model, and quiz session.
//!
//! This crate turns document text into a capped set of multiple-choice
//! questions through a text-generation provider, and runs quiz sessions over
//! the result.

pub mod chunker;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod traits;

pub use error::{GenerationError, ParseError, PipelineError, ProviderError, SessionError};
pub use model::{AnswerSpec, ExamSet, Model, QuestionRecord, Selection, SelectionMode};
pub use session::{Feedback, QuizSession, ScoreSummary};
