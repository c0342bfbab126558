//! Core trait definitions for text-generation providers.
//!
//! The async trait is implemented by the `examforge-providers` crate; the
//! pipeline only ever talks to a `dyn LlmProvider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::model::Model;

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for text-generation backends.
///
/// Implementations own their credential; a request carries only what varies
/// per call.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Issue one completion request.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError>;

    /// List models this provider can serve.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// One request to the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model to use.
    pub model: Model,
    /// Role-setting instruction.
    pub system_prompt: String,
    /// Content-bearing instruction.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

/// Response from the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw completion text.
    pub content: String,
    /// Model identifier the service reports having used.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
        self.total_tokens += rhs.total_tokens;
    }
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub model: Model,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}
