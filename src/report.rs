//! Report models built from pipeline results
//!
//! [`RecommendReport`] is the answer for one draft. [`CorpusReport`] is the
//! per-text analysis of a corpus.

use crate::ai::{count_tokens, DEFAULT_TOKENIZER_MODEL};
use crate::models::{CorpusSummary, Sentiment, Suggestion, TokenUsage, WeakSpan};
use crate::nlp::TextMetrics;
use crate::pipeline::PipelineState;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of topics and keywords attached to each analyzed text
pub const PER_TEXT_TERMS: usize = 5;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Token budget of a request, in provider terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCost {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Recommendation for a single draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendReport {
    pub suggestions: Vec<Suggestion>,
    pub weak_sections: Vec<WeakSpan>,
    /// Clamped readability, 2 decimals
    pub readability: f64,
    /// Keyword relevance on a 0-1 scale, 2 decimals
    pub relevance: f64,
    pub final_score: u8,
    /// Prompt tokens include the draft's own tokens
    pub token_usage: TokenUsage,
    pub estimated_token_cost: TokenCost,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RecommendReport {
    /// Build the report from a finished pipeline state.
    ///
    /// `draft_tokens` is added to the model's prompt tokens.
    pub fn from_state(state: &PipelineState, draft_tokens: u64) -> Self {
        let scores = state.scores.unwrap_or_default();
        let llm = state.llm_token_usage();
        let usage = TokenUsage::new(draft_tokens + llm.prompt, llm.completion);

        Self {
            suggestions: state.refined_suggestions().to_vec(),
            weak_sections: state.weak_sections().to_vec(),
            readability: round2(scores.readability_norm),
            relevance: round2(scores.keyword_relevance / 100.0),
            final_score: scores.final_score,
            token_usage: usage,
            estimated_token_cost: TokenCost {
                input_tokens: usage.prompt,
                output_tokens: usage.completion,
            },
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Analysis of one text of a corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub suggested_keywords: Vec<String>,
    /// Raw Flesch reading ease, 2 decimals
    pub readability: f64,
    pub token_usage: TokenUsage,
}

/// Per-text analysis plus the corpus-wide summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub results: Vec<TextAnalysis>,
    pub corpus_summary: CorpusSummary,
}

impl CorpusReport {
    /// Analyze every text against the terms of the whole collection.
    ///
    /// Text tokens are counted with [`DEFAULT_TOKENIZER_MODEL`], whatever
    /// model the refiner is configured for.
    pub fn build(texts: &[String], metrics: &dyn TextMetrics, top_k: usize) -> Self {
        let terms = metrics.extract_terms(texts, top_k);
        let topics: Vec<String> = terms.topics.iter().take(PER_TEXT_TERMS).cloned().collect();
        let keywords: Vec<String> = terms
            .keywords
            .iter()
            .take(PER_TEXT_TERMS)
            .cloned()
            .collect();

        let results: Vec<TextAnalysis> = texts
            .par_iter()
            .map(|text| {
                let tokens = count_tokens(text, DEFAULT_TOKENIZER_MODEL) as u64;
                TextAnalysis {
                    sentiment: metrics.sentiment(text),
                    topics: topics.clone(),
                    suggested_keywords: keywords.clone(),
                    readability: round2(metrics.readability(text)),
                    token_usage: TokenUsage::new(tokens, 0),
                }
            })
            .collect();

        let sentiment = Sentiment::average(
            &results.iter().map(|r| r.sentiment).collect::<Vec<_>>(),
        );

        Self {
            results,
            corpus_summary: CorpusSummary {
                topics: terms.topics,
                keywords: terms.keywords,
                sentiment,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoreBundle, UserProfile};
    use crate::nlp::DefaultTextMetrics;
    use crate::pipeline::StateDelta;

    #[test]
    fn test_recommend_report_rounding_and_tokens() {
        let state = PipelineState::new(vec![], "draft", UserProfile::new(), "").merge(StateDelta {
            scores: Some(ScoreBundle {
                keyword_relevance: 43.219,
                readability_norm: 71.456,
                profile_alignment: 0.0,
                final_score: 39,
            }),
            llm_token_usage: Some(TokenUsage::new(120, 24)),
            ..Default::default()
        });
        let report = RecommendReport::from_state(&state, 10);

        assert_eq!(report.readability, 71.46);
        assert_eq!(report.relevance, 0.43);
        assert_eq!(report.final_score, 39);
        assert_eq!(report.token_usage, TokenUsage::new(130, 24));
        assert_eq!(report.estimated_token_cost.input_tokens, 130);
        assert_eq!(report.estimated_token_cost.output_tokens, 24);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_recommend_report_without_scores() {
        let state = PipelineState::default();
        let report = RecommendReport::from_state(&state, 0).with_warning("offline");
        assert_eq!(report.final_score, 0);
        assert!(report.suggestions.is_empty());
        assert_eq!(report.warnings, vec!["offline"]);
    }

    #[test]
    fn test_corpus_report() {
        let texts = vec![
            "Content marketing builds trust with readers.".to_string(),
            "Email marketing keeps readers coming back.".to_string(),
        ];
        let metrics = DefaultTextMetrics::default();
        let report = CorpusReport::build(&texts, &metrics, 8);

        assert_eq!(report.results.len(), 2);
        for item in &report.results {
            assert!(item.topics.len() <= PER_TEXT_TERMS);
            assert_eq!(item.suggested_keywords, report.results[0].suggested_keywords);
            assert_eq!(item.token_usage.completion, 0);
            assert!(item.token_usage.prompt > 0);
        }
        assert!(report.corpus_summary.topics.len() >= PER_TEXT_TERMS);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["corpus_summary"]["top_topics"].is_array());
        assert!(json["corpus_summary"]["common_keywords"].is_array());
    }

    #[test]
    fn test_corpus_report_counts_tokens_with_cl100k() {
        let texts = vec!["Keyword research is the backbone of search traffic.".to_string()];
        let report = CorpusReport::build(&texts, &DefaultTextMetrics::default(), 8);
        let expected = count_tokens(&texts[0], crate::ai::FALLBACK_ENCODING) as u64;
        assert_eq!(report.results[0].token_usage, TokenUsage::new(expected, 0));
    }

    #[test]
    fn test_corpus_report_empty() {
        let metrics = DefaultTextMetrics::default();
        let report = CorpusReport::build(&[], &metrics, 8);
        assert!(report.results.is_empty());
        assert!(report.corpus_summary.topics.is_empty());
        assert_eq!(report.corpus_summary.sentiment, Sentiment::NEUTRAL);
    }
}
