//! User-level configuration for draftscope
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/draftscope/config.toml (or an explicit path)

use crate::ai::{AiConfig, LlmBackend};
use crate::nlp::WeakSpanRules;
use crate::pipeline::PipelineConfig;
use crate::scoring::ScoreWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub ai: AiSection,

    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub scoring: ScoreWeights,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AiSection {
    /// Backend: "openai" (default), "anthropic", "deepinfra", "openrouter", "ollama"
    pub backend: Option<String>,

    /// Model override (default depends on backend)
    pub model: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Key for the DeepInfra / OpenRouter backends
    pub api_key: Option<String>,

    pub temperature: Option<f32>,

    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PipelineSection {
    /// Attempts per stage (default: 3)
    pub retries: Option<u32>,

    /// First backoff delay in milliseconds, doubled per attempt (default: 1000)
    pub base_delay_ms: Option<u64>,

    /// Corpus terms to extract (default: 8, minimum 5)
    pub top_k: Option<usize>,

    /// Sentences longer than this many words are weak (default: 28)
    pub long_sentence_words: Option<usize>,

    /// Similarity to generic filler above which a sentence is weak (default: 0.35)
    pub generic_threshold: Option<f64>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/draftscope/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = match Self::user_config_path().filter(|p| p.exists()) {
            Some(path) => Self::from_file(&path).unwrap_or_else(|e| {
                warn!("Ignoring unreadable config {}: {:#}", path.display(), e);
                UserConfig::default()
            }),
            None => UserConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load an explicit config file, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str::<UserConfig>(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override settings from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(backend) = lookup("DRAFTSCOPE_BACKEND") {
            self.ai.backend = Some(backend);
        }
        if let Some(model) = lookup("DRAFTSCOPE_MODEL") {
            self.ai.model = Some(model);
        }
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("draftscope").join("config.toml"))
    }

    /// Configured backend, defaulting to OpenAI
    pub fn backend(&self) -> Result<LlmBackend> {
        match self.ai.backend.as_deref() {
            Some(name) => Ok(name.parse()?),
            None => Ok(LlmBackend::default()),
        }
    }

    /// Settings for the completion client
    pub fn ai_config(&self) -> Result<AiConfig> {
        let defaults = AiConfig::default();
        Ok(AiConfig {
            backend: self.backend()?,
            model: self.ai.model.clone(),
            max_tokens: self.ai.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.ai.temperature.unwrap_or(defaults.temperature),
        })
    }

    /// Credential for the configured backend, if any
    pub fn api_key(&self) -> Option<String> {
        let key = match self.backend().ok()? {
            LlmBackend::OpenAi => self.ai.openai_api_key.clone(),
            LlmBackend::Anthropic => self.ai.anthropic_api_key.clone(),
            LlmBackend::Deepinfra | LlmBackend::OpenRouter => self.ai.api_key.clone(),
            LlmBackend::Ollama => None,
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Whether a live model can be used
    pub fn has_credential(&self) -> bool {
        match self.backend() {
            Ok(backend) => !backend.requires_api_key() || self.api_key().is_some(),
            Err(_) => false,
        }
    }

    /// Explicit pipeline settings
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();
        let rule_defaults = WeakSpanRules::default();
        let p = &self.pipeline;

        let mut weights = self.scoring.clone();
        let parts = (weights.relevance, weights.readability, weights.alignment);
        if weights.relevance < 0.0 || weights.readability < 0.0 || weights.alignment < 0.0 {
            anyhow::bail!("Score weights {:?} must not be negative", parts);
        }
        let sum = weights.relevance + weights.readability + weights.alignment;
        if sum.is_nan() || sum <= 0.0 {
            anyhow::bail!("Score weights {:?} must have a positive sum", parts);
        }
        if !weights.is_valid() {
            warn!("Score weights {:?} do not sum to 1.0; normalizing", parts);
            weights.normalize();
        }

        Ok(PipelineConfig {
            retries: p.retries.unwrap_or(defaults.retries),
            base_delay: p
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            top_k: p.top_k.unwrap_or(defaults.top_k),
            weak_spans: WeakSpanRules {
                max_sentence_words: p
                    .long_sentence_words
                    .unwrap_or(rule_defaults.max_sentence_words),
                generic_threshold: p
                    .generic_threshold
                    .unwrap_or(rule_defaults.generic_threshold),
                ..rule_defaults
            },
            weights,
            tokenizer_model: self.ai_config()?.model().to_string(),
            ..defaults
        })
    }

    /// Write the example config to `path` unless a file already exists
    pub fn write_example(path: &Path) -> Result<bool> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            return Ok(false);
        }
        let example = r#"# draftscope user configuration

[ai]
# Backend: "openai" (default), "anthropic", "deepinfra", "openrouter", "ollama"
# backend = "openai"
# model = "gpt-4o-mini"

# Without a key, suggestions fall back to your corpus keywords
# openai_api_key = "sk-..."
# anthropic_api_key = "sk-ant-..."
# api_key = "..."            # deepinfra / openrouter

# temperature = 0.2
# max_tokens = 1024

[pipeline]
# retries = 3
# base_delay_ms = 1000
# top_k = 8
# long_sentence_words = 28
# generic_threshold = 0.35

[scoring]
# relevance = 0.4
# readability = 0.3
# alignment = 0.3
"#;
        std::fs::write(path, example)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert_eq!(config.backend().unwrap(), LlmBackend::OpenAi);
        assert!(config.api_key().is_none());
        assert!(!config.has_credential());

        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.retries, 3);
        assert_eq!(pipeline.base_delay, Duration::from_secs(1));
        assert_eq!(pipeline.top_k, 8);
        assert_eq!(pipeline.weak_spans, WeakSpanRules::default());
        assert_eq!(pipeline.tokenizer_model, "gpt-4o-mini");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[ai]
backend = "anthropic"
anthropic_api_key = "sk-ant-abc"
model = "claude-3-5-haiku-latest"

[pipeline]
retries = 5
base_delay_ms = 250
long_sentence_words = 20

[scoring]
relevance = 0.5
readability = 0.25
alignment = 0.25
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend().unwrap(), LlmBackend::Anthropic);
        assert_eq!(config.api_key().as_deref(), Some("sk-ant-abc"));
        assert!(config.has_credential());

        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.retries, 5);
        assert_eq!(pipeline.base_delay, Duration::from_millis(250));
        assert_eq!(pipeline.weak_spans.max_sentence_words, 20);
        assert_eq!(pipeline.weak_spans.generic_threshold, 0.35);
        assert_eq!(pipeline.weights.relevance, 0.5);
        assert_eq!(pipeline.tokenizer_model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert!(!config.has_credential());
        assert!(config.scoring.is_valid());
    }

    #[test]
    fn test_invalid_toml_does_not_crash() {
        let bad_toml = "this is [[ not valid toml {{{}}}";
        assert!(toml::from_str::<UserConfig>(bad_toml).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: UserConfig = toml::from_str(
            r#"
[ai]
openai_api_key = "sk-file"
"#,
        )
        .unwrap();
        config.apply_env(env(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("DRAFTSCOPE_MODEL", "gpt-4o"),
        ]));
        assert_eq!(config.api_key().as_deref(), Some("sk-env"));
        assert_eq!(config.ai_config().unwrap().model(), "gpt-4o");
    }

    #[test]
    fn test_key_belongs_to_backend() {
        let mut config = UserConfig::default();
        config.apply_env(env(&[("ANTHROPIC_API_KEY", "sk-ant")]));
        // default backend is OpenAI, so the Anthropic key does not count
        assert!(!config.has_credential());
        config.apply_env(env(&[("DRAFTSCOPE_BACKEND", "anthropic")]));
        assert!(config.has_credential());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = UserConfig::default();
        config.ai.backend = Some("ollama".into());
        assert!(config.has_credential());
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_unknown_backend_is_error() {
        let mut config = UserConfig::default();
        config.ai.backend = Some("gemini".into());
        assert!(config.backend().is_err());
        assert!(!config.has_credential());
    }

    #[test]
    fn test_weights_normalized_or_rejected() {
        let mut config = UserConfig::default();
        config.scoring = ScoreWeights {
            relevance: 2.0,
            readability: 1.0,
            alignment: 1.0,
        };
        assert!(config.pipeline_config().unwrap().weights.is_valid());

        config.scoring.alignment = -1.0;
        let err = config.pipeline_config().unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let mut config = UserConfig::default();
        config.scoring = ScoreWeights {
            relevance: 0.0,
            readability: 0.0,
            alignment: 0.0,
        };
        let err = config.pipeline_config().unwrap_err();
        assert!(err.to_string().contains("positive sum"));

        config.scoring.readability = 0.5;
        let weights = config.pipeline_config().unwrap().weights;
        assert!((weights.readability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_weights_pass_through() {
        let config = UserConfig::default();
        assert_eq!(config.pipeline_config().unwrap().weights, ScoreWeights::default());
    }

    #[test]
    fn test_write_example_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        assert!(UserConfig::write_example(&path).unwrap());
        assert!(!UserConfig::write_example(&path).unwrap());
        let parsed = UserConfig::load_from(&path);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_user_config_path() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("draftscope/config.toml"));
        }
    }
}
