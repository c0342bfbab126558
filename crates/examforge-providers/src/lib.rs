//! examforge-providers: text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI-compatible chat-completion
//! services, plus the configuration that selects and parameterizes them.

pub mod config;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config_from, ExamforgeConfig, ProviderConfig};
pub use examforge_core::error::ProviderError;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
