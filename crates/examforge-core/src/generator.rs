//! Per-chunk question generation.
//!
//! Wraps a provider with the fixed exam-writing instructions. Every call to
//! [`QuestionGenerator::generate`] issues exactly one request; failures are
//! returned to the caller untouched, never retried.

use std::sync::Arc;

use tracing::instrument;

use crate::error::GenerationError;
use crate::model::{Model, MAX_EXAM_QUESTIONS};
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider};

/// Role-setting instruction sent with every chunk.
pub const SYSTEM_PROMPT: &str = "You are a teacher of general education writing an exam about a \
document a student has submitted. Analyse the content carefully and write multiple-choice \
questions at upper secondary school level. Include both questions with exactly one correct \
answer and questions with several correct answers. Reply with a JSON array only, where each \
element has the form {\"question\": \"...\", \"choices\": [\"...\"], \"correct_answer\": \"...\", \
\"explanation\": \"...\"}. Use a string for correct_answer when one choice is correct and an \
array of strings when several are. Every correct answer must be copied verbatim from choices. \
Make sure the JSON is valid.";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Default cap on generated tokens per chunk.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 10096;

/// Build the content-bearing instruction for one chunk.
pub fn user_prompt(chunk_text: &str) -> String {
    format!(
        "Using the following content from the uploaded document, create single-choice and \
         multiple-choice questions. Base every question on information contained in the \
         content. Write as many questions as needed to cover the content, but no more than \
         {MAX_EXAM_QUESTIONS}. Return a JSON array with the structure \
         [{{\"question\": \"...\", \"choices\": [\"...\"], \"correct_answer\": \"...\" or \
         [\"...\"], \"explanation\": \"...\"}}, ...].\n\nDocument content:\n\n{chunk_text}"
    )
}

/// Model parameters for generation requests.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: Model,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: Model::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Sends chunks to a provider and returns its raw output.
pub struct QuestionGenerator {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The request that would be sent for `chunk_text`.
    pub fn build_request(&self, chunk_text: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model,
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: user_prompt(chunk_text),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        }
    }

    /// Ask the provider for questions about one chunk.
    ///
    /// The raw completion text is in [`GenerateResponse::content`].
    #[instrument(skip(self, chunk_text), fields(model = %self.config.model, chars = chunk_text.chars().count()))]
    pub async fn generate(&self, chunk_text: &str) -> Result<GenerateResponse, GenerationError> {
        let request = self.build_request(chunk_text);
        let response = self.provider.generate(&request).await?;
        tracing::debug!(
            latency_ms = response.latency_ms,
            completion_tokens = response.token_usage.completion_tokens,
            "generation call finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ProviderError;
    use crate::traits::{ModelInfo, TokenUsage};

    struct RecordingProvider {
        fail: bool,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> Result<GenerateResponse, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ProviderError::NetworkError("connection reset".into()));
            }
            Ok(GenerateResponse {
                content: "[]".into(),
                model: request.model.to_string(),
                token_usage: TokenUsage::default(),
                latency_ms: 0,
            })
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn provider(fail: bool) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            fail,
            requests: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn request_embeds_chunk_and_config() {
        let generator = QuestionGenerator::new(
            provider(false),
            GenerationConfig {
                model: Model::Gpt41,
                temperature: 0.2,
                max_output_tokens: 512,
            },
        );
        let request = generator.build_request("Photosynthesis converts light.");
        assert_eq!(request.model, Model::Gpt41);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_output_tokens, 512);
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
        assert!(request
            .user_prompt
            .ends_with("Document content:\n\nPhotosynthesis converts light."));
        assert!(request.user_prompt.contains("no more than 20"));
    }

    #[tokio::test]
    async fn one_call_per_generate() {
        let stub = provider(false);
        let generator = QuestionGenerator::new(stub.clone(), GenerationConfig::default());
        let response = generator.generate("Some text.").await.unwrap();
        assert_eq!(response.content, "[]");
        assert_eq!(stub.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_wrapped_without_retry() {
        let stub = provider(true);
        let generator = QuestionGenerator::new(stub.clone(), GenerationConfig::default());
        let err = generator.generate("Some text.").await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(matches!(
            err.provider_error(),
            ProviderError::NetworkError(_)
        ));
        assert_eq!(stub.requests.lock().unwrap().len(), 1);
    }
}
