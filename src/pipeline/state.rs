//! Pipeline state and stage deltas
//!
//! The state is an immutable record handed from stage to stage. A stage
//! never edits it; it returns a [`StateDelta`] and the orchestrator builds
//! the next state with [`PipelineState::merge`]. Merging is last-write-wins
//! per key, with no deep merge of nested values.

use crate::models::{ScoreBundle, Sentiment, Suggestion, TokenUsage, UserProfile, WeakSpan};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Names of the values carried by the pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    PastTexts,
    Draft,
    UserProfile,
    CursorContext,
    CorpusTopics,
    CorpusKeywords,
    CorpusSentiment,
    WeakSections,
    Readability,
    BaselineSuggestions,
    RefinedSuggestions,
    LlmTokenUsage,
    Scores,
}

impl StateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::PastTexts => "past_texts",
            StateKey::Draft => "draft",
            StateKey::UserProfile => "user_profile",
            StateKey::CursorContext => "cursor_context",
            StateKey::CorpusTopics => "corpus_topics",
            StateKey::CorpusKeywords => "corpus_keywords",
            StateKey::CorpusSentiment => "corpus_sentiment",
            StateKey::WeakSections => "weak_sections",
            StateKey::Readability => "readability",
            StateKey::BaselineSuggestions => "baseline_suggestions",
            StateKey::RefinedSuggestions => "refined_suggestions",
            StateKey::LlmTokenUsage => "llm_token_usage",
            StateKey::Scores => "scores",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about one request at a given point of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    #[serde(default)]
    pub past_texts: Vec<String>,
    #[serde(default)]
    pub draft: String,
    #[serde(default)]
    pub user_profile: UserProfile,
    /// Reserved; carried through but not read by any stage
    #[serde(default)]
    pub cursor_context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weak_sections: Option<Vec<WeakSpan>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_suggestions: Option<Vec<Suggestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_suggestions: Option<Vec<Suggestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_token_usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreBundle>,
}

impl PipelineState {
    /// Initial state for one request
    pub fn new(
        past_texts: Vec<String>,
        draft: impl Into<String>,
        user_profile: UserProfile,
        cursor_context: impl Into<String>,
    ) -> Self {
        Self {
            past_texts,
            draft: draft.into(),
            user_profile,
            cursor_context: cursor_context.into(),
            ..Default::default()
        }
    }

    pub fn corpus_topics(&self) -> &[String] {
        self.corpus_topics.as_deref().unwrap_or_default()
    }

    pub fn corpus_keywords(&self) -> &[String] {
        self.corpus_keywords.as_deref().unwrap_or_default()
    }

    pub fn weak_sections(&self) -> &[WeakSpan] {
        self.weak_sections.as_deref().unwrap_or_default()
    }

    pub fn baseline_suggestions(&self) -> &[Suggestion] {
        self.baseline_suggestions.as_deref().unwrap_or_default()
    }

    pub fn refined_suggestions(&self) -> &[Suggestion] {
        self.refined_suggestions.as_deref().unwrap_or_default()
    }

    pub fn llm_token_usage(&self) -> TokenUsage {
        self.llm_token_usage.unwrap_or_default()
    }

    /// Build the next state, taking every key the delta sets
    pub fn merge(self, delta: StateDelta) -> PipelineState {
        PipelineState {
            corpus_topics: delta.corpus_topics.or(self.corpus_topics),
            corpus_keywords: delta.corpus_keywords.or(self.corpus_keywords),
            corpus_sentiment: delta.corpus_sentiment.or(self.corpus_sentiment),
            weak_sections: delta.weak_sections.or(self.weak_sections),
            readability: delta.readability.or(self.readability),
            baseline_suggestions: delta.baseline_suggestions.or(self.baseline_suggestions),
            refined_suggestions: delta.refined_suggestions.or(self.refined_suggestions),
            llm_token_usage: delta.llm_token_usage.or(self.llm_token_usage),
            scores: delta.scores.or(self.scores),
            ..self
        }
    }

    /// Keys that currently hold a value
    pub fn has(&self, key: StateKey) -> bool {
        match key {
            StateKey::PastTexts
            | StateKey::Draft
            | StateKey::UserProfile
            | StateKey::CursorContext => true,
            StateKey::CorpusTopics => self.corpus_topics.is_some(),
            StateKey::CorpusKeywords => self.corpus_keywords.is_some(),
            StateKey::CorpusSentiment => self.corpus_sentiment.is_some(),
            StateKey::WeakSections => self.weak_sections.is_some(),
            StateKey::Readability => self.readability.is_some(),
            StateKey::BaselineSuggestions => self.baseline_suggestions.is_some(),
            StateKey::RefinedSuggestions => self.refined_suggestions.is_some(),
            StateKey::LlmTokenUsage => self.llm_token_usage.is_some(),
            StateKey::Scores => self.scores.is_some(),
        }
    }

    /// The state as a string-keyed mapping
    pub fn to_json(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Partial output of one stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDelta {
    pub corpus_topics: Option<Vec<String>>,
    pub corpus_keywords: Option<Vec<String>>,
    pub corpus_sentiment: Option<Sentiment>,
    pub weak_sections: Option<Vec<WeakSpan>>,
    pub readability: Option<f64>,
    pub baseline_suggestions: Option<Vec<Suggestion>>,
    pub refined_suggestions: Option<Vec<Suggestion>>,
    pub llm_token_usage: Option<TokenUsage>,
    pub scores: Option<ScoreBundle>,
}

impl StateDelta {
    /// Keys this delta sets
    pub fn keys(&self) -> Vec<StateKey> {
        let mut keys = Vec::new();
        let mut push = |present: bool, key| {
            if present {
                keys.push(key);
            }
        };
        push(self.corpus_topics.is_some(), StateKey::CorpusTopics);
        push(self.corpus_keywords.is_some(), StateKey::CorpusKeywords);
        push(self.corpus_sentiment.is_some(), StateKey::CorpusSentiment);
        push(self.weak_sections.is_some(), StateKey::WeakSections);
        push(self.readability.is_some(), StateKey::Readability);
        push(self.baseline_suggestions.is_some(), StateKey::BaselineSuggestions);
        push(self.refined_suggestions.is_some(), StateKey::RefinedSuggestions);
        push(self.llm_token_usage.is_some(), StateKey::LlmTokenUsage);
        push(self.scores.is_some(), StateKey::Scores);
        keys
    }
}
