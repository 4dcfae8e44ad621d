//! Weighted draft scorer
//!
//! Combines keyword relevance, readability and profile alignment into a
//! [`ScoreBundle`].

use crate::models::{ScoreBundle, UserProfile};
use crate::nlp::TextMetrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weights for the three score components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight for keyword relevance (default: 0.4)
    #[serde(default = "default_relevance_weight")]
    pub relevance: f64,

    /// Weight for readability (default: 0.3)
    #[serde(default = "default_readability_weight")]
    pub readability: f64,

    /// Weight for profile alignment (default: 0.3)
    #[serde(default = "default_alignment_weight")]
    pub alignment: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            relevance: default_relevance_weight(),
            readability: default_readability_weight(),
            alignment: default_alignment_weight(),
        }
    }
}

fn default_relevance_weight() -> f64 {
    0.4
}
fn default_readability_weight() -> f64 {
    0.3
}
fn default_alignment_weight() -> f64 {
    0.3
}

impl ScoreWeights {
    /// Validate that weights are non-negative and sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        let parts = [self.relevance, self.readability, self.alignment];
        let sum: f64 = parts.iter().sum();
        parts.iter().all(|w| *w >= 0.0) && (sum - 1.0).abs() < 0.001
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.relevance + self.readability + self.alignment;
        if sum > 0.0 {
            self.relevance /= sum;
            self.readability /= sum;
            self.alignment /= sum;
        }
    }
}

pub fn clamp_0_100(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 100.0)
}

/// Scores a draft against its suggestions and the writer's profile
pub struct DraftScorer<'a> {
    metrics: &'a dyn TextMetrics,
    weights: &'a ScoreWeights,
}

impl<'a> DraftScorer<'a> {
    pub fn new(metrics: &'a dyn TextMetrics, weights: &'a ScoreWeights) -> Self {
        Self { metrics, weights }
    }

    /// Calculate the score bundle for `draft`
    pub fn calculate(
        &self,
        draft: &str,
        suggested_phrases: &[String],
        profile: &UserProfile,
    ) -> ScoreBundle {
        let phrases_text = suggested_phrases.join(" ");
        let keyword_relevance = clamp_0_100(self.metrics.similarity(draft, &phrases_text) * 100.0);

        let readability_norm = clamp_0_100(self.metrics.readability(draft));

        let prefs_text = profile.preferred_topics_text();
        let profile_alignment = clamp_0_100(self.metrics.similarity(draft, &prefs_text) * 100.0);

        let final_score = self.combine(keyword_relevance, readability_norm, profile_alignment);

        debug!(
            "Score components: relevance={:.2}, readability={:.2}, alignment={:.2} -> {}",
            keyword_relevance, readability_norm, profile_alignment, final_score
        );

        ScoreBundle {
            keyword_relevance,
            readability_norm,
            profile_alignment,
            final_score,
        }
    }

    /// Weighted sum of already-clamped components, rounded half to even
    pub fn combine(&self, relevance: f64, readability: f64, alignment: f64) -> u8 {
        let w = self.weights;
        let weighted =
            relevance * w.relevance + readability * w.readability + alignment * w.alignment;
        clamp_0_100(weighted.round_ties_even()) as u8
    }
}
