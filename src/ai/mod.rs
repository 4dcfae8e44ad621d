//! LLM-backed suggestion refinement
//!
//! This module provides the completion side of the pipeline with support for
//! multiple LLM backends (OpenAI, Anthropic and OpenAI-compatible hosts).
//! Uses BYOK (bring your own key): keys come from the user config or the
//! environment, and are handed to [`AiClient`] explicitly.
//!
//! Without a key the [`OfflineCompletion`] provider stands in, returning an
//! empty placeholder and an estimated token count so the pipeline's output
//! keeps its shape.
//!
//! # Example
//!
//! ```rust,ignore
//! use draftscope::ai::{AiClient, AiConfig, LiveCompletion};
//!
//! let client = AiClient::new(AiConfig::default(), api_key);
//! let provider = LiveCompletion::new(client);
//! let completion = provider.complete_structured(&prompt)?;
//! ```

mod client;
mod completion;
mod prompts;
mod tokens;

pub use client::{AiClient, AiConfig, ChatCompletion, LlmBackend, Message, ProviderUsage, Role};
pub use completion::{
    offline_completion_tokens, safe_json, ChatModel, CompletionProvider, LiveCompletion,
    OfflineCompletion, StructuredCompletion,
};
pub use prompts::{RefinePromptBuilder, REFINE_SYSTEM_PROMPT};
pub use tokens::{count_tokens, DEFAULT_TOKENIZER_MODEL, FALLBACK_ENCODING};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type AiResult<T> = Result<T, AiError>;
