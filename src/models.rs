//! Core data models for draftscope
//!
//! These models are shared by the text metrics, the pipeline stages and the
//! reporters. All of them are request-scoped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Positive / neutral / negative proportions of a text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Sentiment {
    /// Fully neutral sentiment, used for empty inputs
    pub const NEUTRAL: Sentiment = Sentiment {
        positive: 0.0,
        neutral: 1.0,
        negative: 0.0,
    };

    /// Average the proportions of several texts. Empty input is neutral.
    pub fn average(items: &[Sentiment]) -> Sentiment {
        if items.is_empty() {
            return Sentiment::NEUTRAL;
        }
        let n = items.len() as f64;
        Sentiment {
            positive: items.iter().map(|s| s.positive).sum::<f64>() / n,
            neutral: items.iter().map(|s| s.neutral).sum::<f64>() / n,
            negative: items.iter().map(|s| s.negative).sum::<f64>() / n,
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Sentiment::NEUTRAL
    }
}

/// Topic and keyword summary of the past-text corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Most significant first
    #[serde(rename = "top_topics")]
    pub topics: Vec<String>,
    /// Same ordering as topics
    #[serde(rename = "common_keywords")]
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
}

/// Ranked terms extracted from a text collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTerms {
    pub topics: Vec<String>,
    pub keywords: Vec<String>,
}

/// A weak region of the draft.
///
/// `span` is a half-open interval of character (not byte) offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakSpan {
    pub span: (usize, usize),
    pub issue: String,
    pub fix_hint: String,
}

impl WeakSpan {
    pub fn start(&self) -> usize {
        self.span.0
    }

    pub fn end(&self) -> usize {
        self.span.1
    }
}

/// A ranked phrase suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub phrase: String,
    /// 1-based, dense
    pub rank: usize,
    pub why: String,
}

/// Rationale attached to provider suggestions that do not carry one
pub const DEFAULT_REFINED_WHY: &str = "refined by agent";

/// Suggestion as returned by a completion provider.
///
/// Providers return either objects or bare strings; both shapes are accepted
/// and resolved into [`Suggestion`] exactly once.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SuggestionItem {
    Structured {
        #[serde(alias = "text")]
        phrase: String,
        #[serde(default)]
        rank: Option<Value>,
        #[serde(default)]
        why: Option<String>,
    },
    Bare(String),
}

impl SuggestionItem {
    /// Resolve into a [`Suggestion`] at the given 0-based position.
    ///
    /// The provider's own rank is ignored so ranks stay dense.
    pub fn resolve(self, position: usize) -> Suggestion {
        let (phrase, why) = match self {
            SuggestionItem::Structured { phrase, why, .. } => {
                (phrase, why.unwrap_or_else(|| DEFAULT_REFINED_WHY.to_string()))
            }
            SuggestionItem::Bare(phrase) => (phrase, DEFAULT_REFINED_WHY.to_string()),
        };
        Suggestion {
            phrase,
            rank: position + 1,
            why,
        }
    }

    /// Parse a provider `suggestions` array, dropping entries of unknown shape.
    pub fn parse_list(value: Option<&Value>) -> Vec<SuggestionItem> {
        let Some(Value::Array(items)) = value else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }
}

/// Composite quality score for a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBundle {
    pub keyword_relevance: f64,
    pub readability_norm: f64,
    pub profile_alignment: f64,
    pub final_score: u8,
}

/// Token accounting for one completion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
    pub total: u64,
}

impl TokenUsage {
    pub fn new(prompt: u64, completion: u64) -> Self {
        Self {
            prompt,
            completion,
            total: prompt + completion,
        }
    }
}

/// Free-form writer profile.
///
/// Only `preferred_topics` is interpreted; everything else is passed through
/// to the refinement prompt untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, Value>);

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for tests and callers that know their topics
    pub fn with_preferred_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = topics
            .into_iter()
            .map(|t| Value::String(t.into()))
            .collect();
        self.0
            .insert("preferred_topics".to_string(), Value::Array(list));
        self
    }

    /// Preferred topics flattened into one space-joined string
    pub fn preferred_topics_text(&self) -> String {
        match self.0.get("preferred_topics") {
            None | Some(Value::Null) => String::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::new(120, 24);
        assert_eq!(usage.total, 144);
    }

    #[test]
    fn test_sentiment_average_empty_is_neutral() {
        assert_eq!(Sentiment::average(&[]), Sentiment::NEUTRAL);
    }

    #[test]
    fn test_suggestion_item_shapes() {
        let items = SuggestionItem::parse_list(Some(&json!([
            {"phrase": "keyword research", "rank": 1, "why": "matches corpus"},
            "long-tail queries",
            {"text": "search intent"},
            42,
            {"no_phrase": true}
        ])));
        assert_eq!(items.len(), 3);

        let resolved: Vec<Suggestion> = items
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.resolve(i))
            .collect();
        assert_eq!(resolved[0].phrase, "keyword research");
        assert_eq!(resolved[0].why, "matches corpus");
        assert_eq!(resolved[1].phrase, "long-tail queries");
        assert_eq!(resolved[1].why, DEFAULT_REFINED_WHY);
        assert_eq!(resolved[2].phrase, "search intent");
        let ranks: Vec<usize> = resolved.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_suggestion_list_not_array() {
        assert!(SuggestionItem::parse_list(None).is_empty());
        assert!(SuggestionItem::parse_list(Some(&json!("nope"))).is_empty());
    }

    #[test]
    fn test_preferred_topics_text() {
        let profile = UserProfile::new().with_preferred_topics(["seo", "content strategy"]);
        assert_eq!(profile.preferred_topics_text(), "seo content strategy");

        let mut scalar = UserProfile::new();
        scalar
            .0
            .insert("preferred_topics".into(), json!("marketing"));
        assert_eq!(scalar.preferred_topics_text(), "marketing");

        assert_eq!(UserProfile::new().preferred_topics_text(), "");
    }
}
