//! Error types for the generation pipeline and the quiz session.
//!
//! Provider failures are typed so the pipeline can wrap them without string
//! matching. Parse failures always carry a bounded excerpt of the raw
//! response for diagnosis.

use thiserror::Error;

/// Number of characters of a raw response kept for diagnostics.
pub const EXCERPT_CHARS: usize = 500;

/// Errors that can occur when interacting with a text-generation service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered, but the body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A generation call for one chunk failed.
#[derive(Debug, Error)]
#[error("question generation failed: {source}")]
pub struct GenerationError {
    #[from]
    source: ProviderError,
}

impl GenerationError {
    /// The underlying provider failure.
    pub fn provider_error(&self) -> &ProviderError {
        &self.source
    }
}

/// The raw response could not be turned into question records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No `[` ... `]` pair was found in the response.
    #[error("no JSON data found in the response. First 500 characters of response:\n{excerpt}...")]
    NoJsonFound { excerpt: String },

    /// The bracketed payload is not valid JSON.
    #[error("JSON parsing error: {message}\n\nFirst 500 characters of response:\n{excerpt}...")]
    JsonDecode { message: String, excerpt: String },

    /// The payload is valid JSON but not a valid list of question records.
    #[error("unexpected error: {message}\n\nFirst 500 characters of response:\n{excerpt}...")]
    Unexpected { message: String, excerpt: String },
}

impl ParseError {
    /// The diagnostic prefix of the offending response.
    pub fn excerpt(&self) -> &str {
        match self {
            ParseError::NoJsonFound { excerpt }
            | ParseError::JsonDecode { excerpt, .. }
            | ParseError::Unexpected { excerpt, .. } => excerpt,
        }
    }
}

/// A question record violates one of its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("question has no choices")]
    NoChoices,

    #[error("duplicate choice: {0:?}")]
    DuplicateChoice(String),

    #[error("correct answer {0:?} is not one of the choices")]
    UnknownAnswer(String),

    #[error("multiple-answer question lists no correct answers")]
    EmptyAnswer,
}

/// Errors surfaced by a full generation run.
///
/// Chunk indices are zero-based.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chunk {chunk}: {source}")]
    Generation {
        chunk: usize,
        #[source]
        source: GenerationError,
    },

    #[error("chunk {chunk}: {source}")]
    Parse {
        chunk: usize,
        #[source]
        source: ParseError,
    },

    /// Every chunk succeeded but none produced a question.
    #[error("no questions could be generated from the document")]
    EmptyResult,
}

impl PipelineError {
    /// Index of the chunk that failed, if the failure is tied to one.
    pub fn chunk(&self) -> Option<usize> {
        match self {
            PipelineError::Generation { chunk, .. } | PipelineError::Parse { chunk, .. } => {
                Some(*chunk)
            }
            PipelineError::EmptyResult => None,
        }
    }
}

/// A submission the quiz session refused. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question {index} does not exist (exam has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("question {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("question {index} expects {expected} selection")]
    SelectionMismatch {
        index: usize,
        expected: crate::model::SelectionMode,
    },

    #[error("{choice:?} is not a choice of question {index}")]
    UnknownChoice { index: usize, choice: String },
}
