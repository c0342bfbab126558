//! Subcommand implementations and the plumbing they share.

pub mod generate;
pub mod init;
pub mod list_models;
pub mod quiz;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use examforge_core::chunker::Chunk;
use examforge_core::generator::QuestionGenerator;
use examforge_core::model::{ExamSet, Model};
use examforge_core::pipeline::{generate_exam, ProgressReporter};
use examforge_core::traits::{LlmProvider, TokenUsage};
use examforge_providers::config::{load_config_from, ExamforgeConfig};
use examforge_providers::create_provider;

/// Options that control how questions are generated. CLI values win over the
/// config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Model to use (e.g. "gpt-4o-mini", "gpt-4.1")
    #[arg(long)]
    pub model: Option<Model>,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Maximum chunk length in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum number of questions (1 to 20)
    #[arg(long)]
    pub max_questions: Option<usize>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GenerationArgs {
    /// Load the config file and apply the CLI overrides on top.
    pub fn resolve(&self) -> Result<ExamforgeConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.max_chunk_chars = chunk_size;
        }
        if let Some(max_questions) = self.max_questions {
            config.max_questions = max_questions;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Console progress reporter.
pub struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_chunk_start(&self, chunk: &Chunk, total_chunks: usize) {
        eprintln!(
            "  Generating: chunk {}/{} ({} chars)",
            chunk.index + 1,
            total_chunks,
            chunk.char_len()
        );
    }

    fn on_chunk_complete(&self, chunk: &Chunk, parsed: usize, accumulated: usize) {
        eprintln!(
            "  Done: chunk {} produced {parsed} questions ({accumulated} so far)",
            chunk.index + 1
        );
    }

    fn on_cap_reached(&self, cap: usize, dropped_questions: usize, skipped_chunks: usize) {
        eprintln!(
            "  Reached the {cap}-question limit: dropped {dropped_questions} questions, skipped {skipped_chunks} chunks"
        );
    }

    fn on_complete(&self, questions: usize, usage: TokenUsage, elapsed: Duration) {
        eprintln!(
            "\nComplete: {questions} questions, {} tokens ({:.1}s)",
            usage.total_tokens,
            elapsed.as_secs_f64()
        );
    }
}

/// Read the source document.
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input document: {}", path.display()))
}

/// Run the full generation pipeline over `text`.
pub async fn build_exam(
    text: &str,
    config: &ExamforgeConfig,
    progress: &dyn ProgressReporter,
) -> Result<ExamSet> {
    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(&config.provider)?);
    let generator = QuestionGenerator::new(provider, config.generation_config());

    eprintln!(
        "examforge v{} | {} via {} | up to {} questions",
        env!("CARGO_PKG_VERSION"),
        config.model,
        generator.provider_name(),
        config.max_questions
    );
    eprintln!();

    let exam = generate_exam(text, &generator, &config.pipeline_config(), progress)
        .await
        .context("exam generation failed")?;
    Ok(exam)
}
