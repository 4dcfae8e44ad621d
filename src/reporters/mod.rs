//! Output reporters for draftscope results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::report::{CorpusReport, RecommendReport};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a draft recommendation in the specified format
pub fn render_recommend(report: &RecommendReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_recommend(report),
        OutputFormat::Json => json::render(report),
    }
}

/// Render a corpus analysis in the specified format
pub fn render_corpus(report: &CorpusReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_corpus(report),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Sentiment, Suggestion, TokenUsage, WeakSpan};
    use crate::report::TokenCost;

    /// Create a minimal RecommendReport for testing
    pub(crate) fn test_recommend_report() -> RecommendReport {
        RecommendReport {
            suggestions: vec![
                Suggestion {
                    phrase: "keyword research".into(),
                    rank: 1,
                    why: "common in past corpus".into(),
                },
                Suggestion {
                    phrase: "search intent".into(),
                    rank: 2,
                    why: "refined by agent".into(),
                },
            ],
            weak_sections: vec![WeakSpan {
                span: (0, 42),
                issue: "low specificity / long sentence".into(),
                fix_hint: "shorten and add concrete detail".into(),
            }],
            readability: 64.3,
            relevance: 0.27,
            final_score: 41,
            token_usage: TokenUsage::new(180, 36),
            estimated_token_cost: TokenCost {
                input_tokens: 180,
                output_tokens: 36,
            },
            warnings: vec!["No API credential configured; used offline suggestions".into()],
        }
    }

    /// Create a minimal CorpusReport for testing
    pub(crate) fn test_corpus_report() -> CorpusReport {
        use crate::models::CorpusSummary;
        use crate::report::TextAnalysis;

        CorpusReport {
            results: vec![TextAnalysis {
                sentiment: Sentiment {
                    positive: 0.3,
                    neutral: 0.7,
                    negative: 0.0,
                },
                topics: vec!["marketing".into(), "readers".into()],
                suggested_keywords: vec!["marketing".into()],
                readability: 55.12,
                token_usage: TokenUsage::new(12, 0),
            }],
            corpus_summary: CorpusSummary {
                topics: vec!["marketing".into(), "readers".into()],
                keywords: vec!["marketing".into(), "readers".into()],
                sentiment: Sentiment::NEUTRAL,
            },
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display_roundtrip() {
        for fmt in [OutputFormat::Text, OutputFormat::Json] {
            assert_eq!(fmt.to_string().parse::<OutputFormat>().unwrap(), fmt);
        }
    }
}
