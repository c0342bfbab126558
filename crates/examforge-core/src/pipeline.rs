//! Exam generation pipeline.
//!
//! Chunks are processed strictly in order with at most one generation call in
//! flight. The run is fail-fast: the first generation or parse failure aborts
//! it and everything accumulated so far is discarded.

use std::time::{Duration, Instant};

use tracing::instrument;
use uuid::Uuid;

use crate::chunker::{self, Chunk, DEFAULT_MAX_CHUNK_CHARS};
use crate::error::PipelineError;
use crate::generator::QuestionGenerator;
use crate::model::{ExamSet, MAX_EXAM_QUESTIONS};
use crate::parser::parse_questions;
use crate::traits::TokenUsage;

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on chunk length in characters.
    pub max_chunk_chars: usize,
    /// Maximum number of questions kept. Clamped to `1..=MAX_EXAM_QUESTIONS`.
    pub question_cap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            question_cap: MAX_EXAM_QUESTIONS,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_chunk_start(&self, chunk: &Chunk, total_chunks: usize);
    fn on_chunk_complete(&self, chunk: &Chunk, parsed: usize, accumulated: usize);
    fn on_cap_reached(&self, cap: usize, dropped_questions: usize, skipped_chunks: usize);
    fn on_complete(&self, questions: usize, usage: TokenUsage, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_chunk_start(&self, _: &Chunk, _: usize) {}
    fn on_chunk_complete(&self, _: &Chunk, _: usize, _: usize) {}
    fn on_cap_reached(&self, _: usize, _: usize, _: usize) {}
    fn on_complete(&self, _: usize, _: TokenUsage, _: Duration) {}
}

/// Split `text` and turn it into an exam.
pub async fn generate_exam(
    text: &str,
    generator: &QuestionGenerator,
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<ExamSet, PipelineError> {
    let chunks = chunker::split(text, config.max_chunk_chars);
    tracing::debug!(
        chunks = chunks.len(),
        max_chunk_chars = config.max_chunk_chars,
        "document split"
    );
    aggregate(&chunks, generator, config.question_cap, progress).await
}

/// Generate and parse questions chunk by chunk, keeping at most `cap`.
///
/// Once the accumulated questions reach `cap` they are truncated to exactly
/// `cap` and the remaining chunks are not sent. A run where every chunk
/// succeeds but yields nothing fails with [`PipelineError::EmptyResult`].
#[instrument(skip_all, fields(run_id = %Uuid::new_v4(), chunks = chunks.len()))]
pub async fn aggregate(
    chunks: &[Chunk],
    generator: &QuestionGenerator,
    cap: usize,
    progress: &dyn ProgressReporter,
) -> Result<ExamSet, PipelineError> {
    let start = Instant::now();
    let cap = cap.clamp(1, MAX_EXAM_QUESTIONS);
    let mut questions = Vec::new();
    let mut usage = TokenUsage::default();

    for (position, chunk) in chunks.iter().enumerate() {
        progress.on_chunk_start(chunk, chunks.len());

        let response =
            generator
                .generate(&chunk.text)
                .await
                .map_err(|source| PipelineError::Generation {
                    chunk: chunk.index,
                    source,
                })?;
        usage += response.token_usage;

        let parsed =
            parse_questions(&response.content).map_err(|source| PipelineError::Parse {
                chunk: chunk.index,
                source,
            })?;
        let parsed_count = parsed.len();
        questions.extend(parsed);

        tracing::debug!(
            chunk = chunk.index,
            parsed = parsed_count,
            accumulated = questions.len(),
            "chunk processed"
        );
        progress.on_chunk_complete(chunk, parsed_count, questions.len().min(cap));

        if questions.len() >= cap {
            let dropped = questions.len() - cap;
            let skipped = chunks.len() - position - 1;
            questions.truncate(cap);
            if dropped > 0 || skipped > 0 {
                tracing::warn!(
                    cap,
                    dropped_questions = dropped,
                    skipped_chunks = skipped,
                    "question cap reached"
                );
            }
            progress.on_cap_reached(cap, dropped, skipped);
            break;
        }
    }

    if questions.is_empty() {
        return Err(PipelineError::EmptyResult);
    }

    let elapsed = start.elapsed();
    tracing::info!(
        questions = questions.len(),
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        elapsed_ms = elapsed.as_millis() as u64,
        "exam generated"
    );
    progress.on_complete(questions.len(), usage, elapsed);

    Ok(ExamSet::from_validated(questions))
}
