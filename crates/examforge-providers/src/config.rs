//! Provider configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examforge_core::chunker::DEFAULT_MAX_CHUNK_CHARS;
use examforge_core::generator::{GenerationConfig, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use examforge_core::model::{Model, MAX_EXAM_QUESTIONS};
use examforge_core::pipeline::PipelineConfig;
use examforge_core::traits::LlmProvider;

use crate::openai::OpenAiProvider;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "EXAMFORGE_API_KEY";

/// Connection settings for the OpenAI-compatible service.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Top-level examforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamforgeConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Model used for generation.
    #[serde(default)]
    pub model: Model,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Upper bound on chunk length in characters.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    /// Question cap for one exam.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}
fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}
fn default_max_questions() -> usize {
    MAX_EXAM_QUESTIONS
}

impl Default for ExamforgeConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            model: Model::default(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_chunk_chars: default_max_chunk_chars(),
            max_questions: default_max_questions(),
        }
    }
}

impl ExamforgeConfig {
    /// Check value ranges before anything is sent to the service.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            );
        }
        if !(1..=MAX_EXAM_QUESTIONS).contains(&self.max_questions) {
            anyhow::bail!(
                "max_questions must be between 1 and {MAX_EXAM_QUESTIONS}, got {}",
                self.max_questions
            );
        }
        if self.max_chunk_chars == 0 {
            anyhow::bail!("max_chunk_chars must be greater than zero");
        }
        if self.provider.api_key.trim().is_empty() {
            anyhow::bail!(
                "no API key configured: set {API_KEY_ENV} or provider.api_key in examforge.toml"
            );
        }
        Ok(())
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: self.model,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_chunk_chars: self.max_chunk_chars,
            question_cap: self.max_questions,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    ProviderConfig {
        api_key: resolve_env_vars(&config.api_key),
        base_url: config.base_url.as_ref().map(|u| resolve_env_vars(u)),
        org_id: config.org_id.as_ref().map(|o| resolve_env_vars(o)),
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `examforge.toml` in the current directory
/// 2. `~/.config/examforge/config.toml`
///
/// `EXAMFORGE_API_KEY` overrides the key from either file.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamforgeConfig::default(),
    };

    Ok(apply_overrides(config, std::env::var(API_KEY_ENV).ok()))
}

/// Resolve `${VAR}` references and apply the key override.
fn apply_overrides(mut config: ExamforgeConfig, key_override: Option<String>) -> ExamforgeConfig {
    if let Some(key) = key_override.filter(|k| !k.is_empty()) {
        config.provider.api_key = key;
    }
    config.provider = resolve_provider_config(&config.provider);
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examforge"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    if config.api_key.trim().is_empty() {
        anyhow::bail!("cannot create provider without an API key");
    }
    Ok(Box::new(OpenAiProvider::new(
        &config.api_key,
        config.base_url.clone(),
        config.org_id.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> ExamforgeConfig {
        ExamforgeConfig {
            provider: ProviderConfig {
                api_key: "sk-test".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EXAMFORGE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EXAMFORGE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EXAMFORGE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_EXAMFORGE_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_rescanned() {
        std::env::set_var("_EXAMFORGE_SELF_REF", "a${_EXAMFORGE_SELF_REF}b");
        assert_eq!(
            resolve_env_vars("x${_EXAMFORGE_SELF_REF}y"),
            "xa${_EXAMFORGE_SELF_REF}by"
        );
        std::env::remove_var("_EXAMFORGE_SELF_REF");
    }

    #[test]
    fn default_config() {
        let config = ExamforgeConfig::default();
        assert_eq!(config.model, Model::Gpt4oMini);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_output_tokens, 10096);
        assert_eq!(config.max_chunk_chars, 3000);
        assert_eq!(config.max_questions, 20);
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
model = "gpt-4.1-mini"
temperature = 0.2
max_questions = 10

[provider]
api_key = "sk-file"
base_url = "http://localhost:8080"
"#;
        let config: ExamforgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, Model::Gpt41Mini);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_questions, 10);
        assert_eq!(config.max_chunk_chars, 3000);
        assert_eq!(config.provider.base_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn unknown_model_is_rejected() {
        let result = toml::from_str::<ExamforgeConfig>(r#"model = "davinci""#);
        assert!(result.is_err());
    }

    #[test]
    fn debug_masks_api_key() {
        let config = valid();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn key_override_wins_over_file() {
        let config = apply_overrides(valid(), Some("sk-env".into()));
        assert_eq!(config.provider.api_key, "sk-env");

        let config = apply_overrides(valid(), Some(String::new()));
        assert_eq!(config.provider.api_key, "sk-test");
    }

    #[test]
    fn key_reference_is_resolved() {
        std::env::set_var("_EXAMFORGE_KEY_REF", "sk-ref");
        let mut config = valid();
        config.provider.api_key = "${_EXAMFORGE_KEY_REF}".into();
        let config = apply_overrides(config, None);
        assert_eq!(config.provider.api_key, "sk-ref");
        std::env::remove_var("_EXAMFORGE_KEY_REF");
    }

    #[test]
    fn validate_ranges() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.max_questions = 0;
        assert!(config.validate().is_err());
        config.max_questions = 21;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.max_chunk_chars = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.provider.api_key = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("EXAMFORGE_API_KEY"));
    }

    #[test]
    fn derived_configs() {
        let mut config = valid();
        config.model = Model::Gpt4o;
        config.max_questions = 5;
        let generation = config.generation_config();
        assert_eq!(generation.model, Model::Gpt4o);
        assert_eq!(generation.max_output_tokens, 10096);
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.question_cap, 5);
        assert_eq!(pipeline.max_chunk_chars, 3000);
    }

    #[test]
    fn load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_chunk_chars = 1200\n[provider]\napi_key = \"sk-file\"").unwrap();
        let config = load_config_from(Some(file.path())).unwrap();
        assert_eq!(config.max_chunk_chars, 1200);
        assert!(!config.provider.api_key.is_empty());
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/examforge.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn create_provider_requires_key() {
        assert!(create_provider(&ProviderConfig::default()).is_err());
        let provider = create_provider(&valid().provider).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
