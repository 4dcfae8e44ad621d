//! The four pipeline stages
//!
//! 1. [`CorpusAnalyzer`] - topics, keywords and sentiment of past texts
//! 2. [`DraftAnalyzer`] - weak spans, readability, baseline suggestions
//! 3. [`Refiner`] - model-refined suggestions, baseline as fallback
//! 4. [`Scorer`] - weighted quality score
//!
//! Each stage is a pure function of the state it is given. Calling `run`
//! twice with the same state does the same work twice.

use super::state::{PipelineState, StateDelta, StateKey};
use crate::ai::{CompletionProvider, RefinePromptBuilder};
use crate::models::{Sentiment, Suggestion, SuggestionItem};
use crate::nlp::TextMetrics;
use crate::scoring::{DraftScorer, ScoreWeights};
use anyhow::Result;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Rationale given to suggestions taken straight from the corpus
pub const BASELINE_WHY: &str = "common in past corpus";

/// One step of the pipeline
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Keys the stage looks at
    fn reads(&self) -> &'static [StateKey];

    /// Keys the stage's delta may set
    fn writes(&self) -> &'static [StateKey];

    fn run(&self, state: &PipelineState) -> Result<StateDelta>;
}

pub struct CorpusAnalyzer {
    metrics: Arc<dyn TextMetrics>,
    top_k: usize,
}

impl CorpusAnalyzer {
    pub fn new(metrics: Arc<dyn TextMetrics>, top_k: usize) -> Self {
        Self { metrics, top_k }
    }
}

impl Stage for CorpusAnalyzer {
    fn name(&self) -> &'static str {
        "analyze_past"
    }

    fn reads(&self) -> &'static [StateKey] {
        &[StateKey::PastTexts]
    }

    fn writes(&self) -> &'static [StateKey] {
        &[
            StateKey::CorpusTopics,
            StateKey::CorpusKeywords,
            StateKey::CorpusSentiment,
        ]
    }

    fn run(&self, state: &PipelineState) -> Result<StateDelta> {
        let texts = &state.past_texts;
        let terms = self.metrics.extract_terms(texts, self.top_k);

        let per_text: Vec<Sentiment> = texts
            .par_iter()
            .map(|t| self.metrics.sentiment(t))
            .collect();
        let sentiment = Sentiment::average(&per_text);

        debug!(
            "Corpus: {} texts, {} topics, sentiment {:?}",
            texts.len(),
            terms.topics.len(),
            sentiment
        );

        Ok(StateDelta {
            corpus_topics: Some(terms.topics),
            corpus_keywords: Some(terms.keywords),
            corpus_sentiment: Some(sentiment),
            ..Default::default()
        })
    }
}

pub struct DraftAnalyzer {
    metrics: Arc<dyn TextMetrics>,
    baseline_count: usize,
}

impl DraftAnalyzer {
    pub fn new(metrics: Arc<dyn TextMetrics>, baseline_count: usize) -> Self {
        Self {
            metrics,
            baseline_count,
        }
    }
}

impl Stage for DraftAnalyzer {
    fn name(&self) -> &'static str {
        "analyze_draft"
    }

    fn reads(&self) -> &'static [StateKey] {
        &[StateKey::Draft, StateKey::CorpusKeywords]
    }

    fn writes(&self) -> &'static [StateKey] {
        &[
            StateKey::WeakSections,
            StateKey::Readability,
            StateKey::BaselineSuggestions,
        ]
    }

    fn run(&self, state: &PipelineState) -> Result<StateDelta> {
        let weak = self.metrics.weak_spans(&state.draft);
        let readability = self.metrics.readability(&state.draft);
        let baseline: Vec<Suggestion> = state
            .corpus_keywords()
            .iter()
            .take(self.baseline_count)
            .enumerate()
            .map(|(i, kw)| Suggestion {
                phrase: kw.clone(),
                rank: i + 1,
                why: BASELINE_WHY.to_string(),
            })
            .collect();

        debug!(
            "Draft: {} weak spans, readability {:.2}, {} baseline suggestions",
            weak.len(),
            readability,
            baseline.len()
        );

        Ok(StateDelta {
            weak_sections: Some(weak),
            readability: Some(readability),
            baseline_suggestions: Some(baseline),
            ..Default::default()
        })
    }
}

pub struct Refiner {
    completion: Arc<dyn CompletionProvider>,
}

impl Refiner {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }
}

impl Stage for Refiner {
    fn name(&self) -> &'static str {
        "llm_refine"
    }

    fn reads(&self) -> &'static [StateKey] {
        &[
            StateKey::Draft,
            StateKey::CorpusTopics,
            StateKey::UserProfile,
            StateKey::BaselineSuggestions,
        ]
    }

    fn writes(&self) -> &'static [StateKey] {
        &[StateKey::RefinedSuggestions, StateKey::LlmTokenUsage]
    }

    fn run(&self, state: &PipelineState) -> Result<StateDelta> {
        let baseline = state.baseline_suggestions();
        let prompt = RefinePromptBuilder::new(state.draft.as_str())
            .topics(state.corpus_topics())
            .baseline(baseline)
            .profile(&state.user_profile)
            .build();

        let completion = self.completion.complete_structured(&prompt)?;

        let refined: Vec<Suggestion> =
            SuggestionItem::parse_list(completion.parsed.get("suggestions"))
                .into_iter()
                .enumerate()
                .map(|(i, item)| item.resolve(i))
                .collect();

        let suggestions = if refined.is_empty() {
            debug!(
                "No refined suggestions (live: {}), using {} baseline suggestions",
                self.completion.is_live(),
                baseline.len()
            );
            baseline.to_vec()
        } else {
            refined
        };

        Ok(StateDelta {
            refined_suggestions: Some(suggestions),
            llm_token_usage: Some(completion.usage),
            ..Default::default()
        })
    }
}

pub struct Scorer {
    metrics: Arc<dyn TextMetrics>,
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(metrics: Arc<dyn TextMetrics>, weights: ScoreWeights) -> Self {
        Self { metrics, weights }
    }
}

impl Stage for Scorer {
    fn name(&self) -> &'static str {
        "score"
    }

    fn reads(&self) -> &'static [StateKey] {
        &[
            StateKey::Draft,
            StateKey::RefinedSuggestions,
            StateKey::UserProfile,
        ]
    }

    fn writes(&self) -> &'static [StateKey] {
        &[StateKey::Scores]
    }

    fn run(&self, state: &PipelineState) -> Result<StateDelta> {
        let phrases: Vec<String> = state
            .refined_suggestions()
            .iter()
            .map(|s| s.phrase.clone())
            .collect();
        let scores = DraftScorer::new(self.metrics.as_ref(), &self.weights).calculate(
            &state.draft,
            &phrases,
            &state.user_profile,
        );

        info!(
            "Draft score: {} (relevance {:.1}, readability {:.1}, alignment {:.1})",
            scores.final_score,
            scores.keyword_relevance,
            scores.readability_norm,
            scores.profile_alignment
        );

        Ok(StateDelta {
            scores: Some(scores),
            ..Default::default()
        })
    }
}
