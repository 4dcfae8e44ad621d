//! Draft recommendation pipeline
//!
//! Orchestrates the full recommendation pipeline:
//! 1. Analyze the past corpus
//! 2. Analyze the draft
//! 3. Refine suggestions with a language model (or offline placeholder)
//! 4. Score the draft
//!
//! Each stage runs under [`retry_with_backoff`]. A stage that still fails
//! after its last attempt aborts the run and no partial state is returned.

mod retry;
mod stages;
mod state;

pub use retry::{retry_with_backoff, RetryPolicy};
pub use stages::{CorpusAnalyzer, DraftAnalyzer, Refiner, Scorer, Stage, BASELINE_WHY};
pub use state::{PipelineState, StateDelta, StateKey};

use crate::ai::CompletionProvider;
use crate::nlp::{DefaultTextMetrics, TextMetrics, WeakSpanRules};
use crate::scoring::ScoreWeights;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Explicit settings for one pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Attempts per stage, including the first
    pub retries: u32,
    pub base_delay: Duration,
    /// Requested number of corpus topics (at least 5 are always returned)
    pub top_k: usize,
    /// Number of corpus keywords offered as baseline suggestions
    pub baseline_count: usize,
    pub weak_spans: WeakSpanRules,
    pub weights: ScoreWeights,
    /// Model whose tokenizer is used for local token counts
    pub tokenizer_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(1),
            top_k: 8,
            baseline_count: 5,
            weak_spans: WeakSpanRules::default(),
            weights: ScoreWeights::default(),
            tokenizer_model: crate::ai::AiConfig::default().model().to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.base_delay)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage '{stage}' failed: {source:#}")]
    Stage {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("stage '{stage}' reads '{key}' before any earlier stage writes it")]
    InvalidOrder {
        stage: &'static str,
        key: StateKey,
        producer: Option<&'static str>,
    },
}

/// Full recommendation pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create the standard four-stage pipeline.
    pub fn new(
        config: PipelineConfig,
        metrics: Arc<dyn TextMetrics>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(CorpusAnalyzer::new(metrics.clone(), config.top_k)),
            Box::new(DraftAnalyzer::new(metrics.clone(), config.baseline_count)),
            Box::new(Refiner::new(completion)),
            Box::new(Scorer::new(metrics, config.weights.clone())),
        ];
        Self { config, stages }
    }

    /// Create the standard pipeline with the built-in text metrics.
    pub fn from_config(config: PipelineConfig, completion: Arc<dyn CompletionProvider>) -> Self {
        let metrics: Arc<dyn TextMetrics> =
            Arc::new(DefaultTextMetrics::new(config.weak_spans.clone()));
        Self::new(config, metrics, completion)
    }

    /// Create a pipeline from custom stages.
    ///
    /// Fails when a stage reads a derived key that no earlier stage writes.
    pub fn with_stages(
        config: PipelineConfig,
        stages: Vec<Box<dyn Stage>>,
    ) -> Result<Self, PipelineError> {
        validate_order(&stages)?;
        Ok(Self { config, stages })
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order and return the final state.
    pub fn run(&self, initial: PipelineState) -> Result<PipelineState, PipelineError> {
        let policy = self.config.retry_policy();
        let started = Instant::now();
        let mut state = initial;

        for stage in &self.stages {
            let stage_started = Instant::now();
            let delta = retry_with_backoff(&policy, stage.name(), || stage.run(&state))
                .map_err(|source| PipelineError::Stage {
                    stage: stage.name(),
                    source,
                })?;
            debug!(
                "Stage {} set {:?} in {:?}",
                stage.name(),
                delta.keys(),
                stage_started.elapsed()
            );
            state = state.merge(delta);
        }

        info!(
            "Pipeline finished {} stages in {:?}",
            self.stages.len(),
            started.elapsed()
        );
        Ok(state)
    }
}

/// Keys present in every initial state
fn is_input(key: StateKey) -> bool {
    matches!(
        key,
        StateKey::PastTexts | StateKey::Draft | StateKey::UserProfile | StateKey::CursorContext
    )
}

fn validate_order(stages: &[Box<dyn Stage>]) -> Result<(), PipelineError> {
    for (i, stage) in stages.iter().enumerate() {
        for &key in stage.reads() {
            if is_input(key) {
                continue;
            }
            let written_before = stages[..i].iter().any(|s| s.writes().contains(&key));
            if !written_before {
                let producer = stages[i + 1..]
                    .iter()
                    .find(|s| s.writes().contains(&key))
                    .map(|s| s.name());
                return Err(PipelineError::InvalidOrder {
                    stage: stage.name(),
                    key,
                    producer,
                });
            }
        }
    }
    Ok(())
}
