//! Structured completion providers
//!
//! A provider turns a prompt into a parsed JSON object plus token usage.
//! Malformed model output never errors: it degrades to an empty object.
//! Transport failures do error, so the caller's retry policy can apply.

use crate::ai::tokens::count_tokens;
use crate::ai::{AiClient, AiResult, ChatCompletion, Message, REFINE_SYSTEM_PROMPT};
use crate::models::TokenUsage;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Parsed completion and its token accounting
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredCompletion {
    pub parsed: Map<String, Value>,
    pub usage: TokenUsage,
}

/// Source of structured completions used by the refiner
pub trait CompletionProvider: Send + Sync {
    fn complete_structured(&self, prompt: &str) -> AiResult<StructuredCompletion>;

    /// Whether completions come from a real model
    fn is_live(&self) -> bool {
        false
    }
}

/// Parse `text` as a JSON object; anything else becomes an empty object
pub fn safe_json(text: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!("Completion was JSON but not an object: {}", other);
            Map::new()
        }
        Err(e) => {
            warn!("Completion was not valid JSON ({}), treating as empty", e);
            Map::new()
        }
    }
}

/// Completion tokens assumed for an offline completion
pub fn offline_completion_tokens(prompt_tokens: u64) -> u64 {
    ((prompt_tokens as f64 * 0.2).round() as u64).max(24)
}

/// Something that can answer a single-turn chat prompt
pub trait ChatModel: Send + Sync {
    fn chat(&self, prompt: &str) -> AiResult<ChatCompletion>;

    fn model_name(&self) -> &str;
}

impl ChatModel for AiClient {
    fn chat(&self, prompt: &str) -> AiResult<ChatCompletion> {
        self.generate(vec![Message::user(prompt)], Some(REFINE_SYSTEM_PROMPT), true)
    }

    fn model_name(&self) -> &str {
        self.model()
    }
}

/// Network-backed provider
pub struct LiveCompletion<C: ChatModel = AiClient> {
    model: C,
}

impl<C: ChatModel> LiveCompletion<C> {
    pub fn new(model: C) -> Self {
        Self { model }
    }
}

impl<C: ChatModel> CompletionProvider for LiveCompletion<C> {
    fn complete_structured(&self, prompt: &str) -> AiResult<StructuredCompletion> {
        let model = self.model.model_name();
        let response = self.model.chat(prompt)?;
        let reported = response.usage.unwrap_or_default();

        let prompt_tokens = reported
            .prompt_tokens
            .unwrap_or_else(|| count_tokens(prompt, model) as u64);
        let completion_tokens = reported
            .completion_tokens
            .unwrap_or_else(|| count_tokens(&response.text, model) as u64);

        debug!(
            "Completion from {}: {} prompt + {} completion tokens",
            model, prompt_tokens, completion_tokens
        );

        Ok(StructuredCompletion {
            parsed: safe_json(&response.text),
            usage: TokenUsage::new(prompt_tokens, completion_tokens),
        })
    }

    fn is_live(&self) -> bool {
        true
    }
}

/// Deterministic stand-in used when no credential is configured
#[derive(Debug, Clone)]
pub struct OfflineCompletion {
    tokenizer_model: String,
}

impl OfflineCompletion {
    pub fn new(tokenizer_model: impl Into<String>) -> Self {
        Self {
            tokenizer_model: tokenizer_model.into(),
        }
    }

    fn placeholder() -> Map<String, Value> {
        let value = json!({
            "suggestions": [],
            "weak_sections": [],
            "readability": null,
            "relevance": null,
            "final_score": null,
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl Default for OfflineCompletion {
    fn default() -> Self {
        Self::new(crate::ai::AiConfig::default().model())
    }
}

impl CompletionProvider for OfflineCompletion {
    fn complete_structured(&self, prompt: &str) -> AiResult<StructuredCompletion> {
        let prompt_tokens = count_tokens(prompt, &self.tokenizer_model) as u64;
        let completion_tokens = offline_completion_tokens(prompt_tokens);
        Ok(StructuredCompletion {
            parsed: Self::placeholder(),
            usage: TokenUsage::new(prompt_tokens, completion_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, ProviderUsage};

    struct CannedModel {
        text: String,
        usage: Option<ProviderUsage>,
    }

    impl ChatModel for CannedModel {
        fn chat(&self, _prompt: &str) -> AiResult<ChatCompletion> {
            Ok(ChatCompletion {
                text: self.text.clone(),
                usage: self.usage,
            })
        }

        fn model_name(&self) -> &str {
            "gpt-4o-mini"
        }
    }

    struct DownModel;

    impl ChatModel for DownModel {
        fn chat(&self, _prompt: &str) -> AiResult<ChatCompletion> {
            Err(AiError::ApiError {
                status: 503,
                message: "overloaded".into(),
            })
        }

        fn model_name(&self) -> &str {
            "gpt-4o-mini"
        }
    }

    #[test]
    fn test_safe_json() {
        assert_eq!(safe_json(r#"{"a": 1}"#).len(), 1);
        assert!(safe_json("not json at all").is_empty());
        assert!(safe_json("[1, 2]").is_empty());
        assert!(safe_json("").is_empty());
    }

    #[test]
    fn test_offline_completion_tokens_floor() {
        assert_eq!(offline_completion_tokens(0), 24);
        assert_eq!(offline_completion_tokens(100), 24);
        assert_eq!(offline_completion_tokens(200), 40);
        assert_eq!(offline_completion_tokens(203), 41);
    }

    #[test]
    fn test_offline_placeholder() {
        let out = OfflineCompletion::default()
            .complete_structured("Suggest phrases for this draft.")
            .unwrap();
        assert_eq!(out.parsed["suggestions"], json!([]));
        assert!(out.parsed["final_score"].is_null());
        assert_eq!(out.usage.total, out.usage.prompt + out.usage.completion);
        assert_eq!(out.usage.completion, offline_completion_tokens(out.usage.prompt));
        assert!(!OfflineCompletion::default().is_live());
    }

    #[test]
    fn test_live_uses_reported_usage() {
        let provider = LiveCompletion::new(CannedModel {
            text: r#"{"suggestions": ["a"]}"#.into(),
            usage: Some(ProviderUsage {
                prompt_tokens: Some(50),
                completion_tokens: Some(9),
            }),
        });
        let out = provider.complete_structured("prompt").unwrap();
        assert_eq!(out.usage, TokenUsage::new(50, 9));
        assert!(provider.is_live());
    }

    #[test]
    fn test_live_counts_when_usage_missing() {
        let text = r#"{"suggestions": [{"phrase": "keyword research"}]}"#;
        let provider = LiveCompletion::new(CannedModel {
            text: text.into(),
            usage: None,
        });
        let out = provider.complete_structured("some prompt").unwrap();
        assert_eq!(out.usage.completion, count_tokens(text, "gpt-4o-mini") as u64);
        assert_eq!(out.usage.prompt, count_tokens("some prompt", "gpt-4o-mini") as u64);
    }

    #[test]
    fn test_live_malformed_output_is_empty() {
        let provider = LiveCompletion::new(CannedModel {
            text: "Sure! Here are some ideas: ...".into(),
            usage: None,
        });
        let out = provider.complete_structured("prompt").unwrap();
        assert!(out.parsed.is_empty());
    }

    #[test]
    fn test_live_transport_error_propagates() {
        let provider = LiveCompletion::new(DownModel);
        assert!(provider.complete_structured("prompt").is_err());
    }
}
