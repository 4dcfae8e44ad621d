//! End-to-end pipeline tests through the library API
//!
//! Every run here uses the offline completion provider, so no network
//! access is needed.

use draftscope::ai::OfflineCompletion;
use draftscope::models::UserProfile;
use draftscope::pipeline::{
    Pipeline, PipelineConfig, PipelineError, PipelineState, Stage, StateDelta, StateKey,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

const SEO_DRAFT: &str =
    "SEO is important. Writing good content about SEO and keyword research is important for growth.";

fn offline_pipeline() -> Pipeline {
    let config = PipelineConfig {
        base_delay: Duration::from_millis(5),
        ..Default::default()
    };
    Pipeline::from_config(config, Arc::new(OfflineCompletion::default()))
}

fn past_texts() -> Vec<String> {
    vec![
        "Keyword research is the backbone of search traffic. Start with intent.".into(),
        "Our growth came from writing useful guides, not from chasing trends.".into(),
        "Content strategy means picking fewer topics and covering them deeply.".into(),
        "We lost readers when posts got long and vague. Short posts won.".into(),
    ]
}

#[test]
fn test_empty_corpus_without_credential() {
    let state = offline_pipeline()
        .run(PipelineState::new(vec![], SEO_DRAFT, UserProfile::new(), ""))
        .unwrap();

    assert!(state.corpus_topics().is_empty());
    assert!(state.refined_suggestions().is_empty());

    let scores = state.scores.unwrap();
    assert_eq!(scores.keyword_relevance, 0.0);
    assert_eq!(scores.profile_alignment, 0.0);
    assert_eq!(
        scores.final_score as f64,
        (0.3 * scores.readability_norm).round_ties_even()
    );
}

#[test]
fn test_empty_corpus_sentiment_is_neutral() {
    let state = offline_pipeline()
        .run(PipelineState::new(vec![], "Draft.", UserProfile::new(), ""))
        .unwrap();
    let s = state.corpus_sentiment.unwrap();
    assert_eq!((s.positive, s.neutral, s.negative), (0.0, 1.0, 0.0));
    assert!(state.corpus_keywords().is_empty());
}

#[test]
fn test_corpus_sentiment_proportions() {
    let state = offline_pipeline()
        .run(PipelineState::new(past_texts(), SEO_DRAFT, UserProfile::new(), ""))
        .unwrap();
    let s = state.corpus_sentiment.unwrap();
    for p in [s.positive, s.neutral, s.negative] {
        assert!((0.0..=1.0).contains(&p), "proportion out of range: {p}");
    }
    assert!((s.positive + s.neutral + s.negative - 1.0).abs() < 1e-3);
}

#[test]
fn test_offline_suggestions_come_from_corpus() {
    let state = offline_pipeline()
        .run(PipelineState::new(past_texts(), SEO_DRAFT, UserProfile::new(), ""))
        .unwrap();
    let refined = state.refined_suggestions();
    assert_eq!(refined, state.baseline_suggestions());
    assert_eq!(refined.len(), 5);
    for (i, s) in refined.iter().enumerate() {
        assert_eq!(s.rank, i + 1);
        assert_eq!(s.phrase, state.corpus_keywords()[i]);
    }

    let usage = state.llm_token_usage();
    assert!(usage.completion >= 24);
    assert_eq!(usage.total, usage.prompt + usage.completion);
}

#[test]
fn test_single_long_sentence_is_one_weak_span() {
    let words = [
        "Yesterday", "our", "small", "team", "shipped", "a", "redesigned", "billing", "page",
        "that", "cut", "refund", "requests", "by", "half", "while", "keeping", "checkout",
        "times", "under", "two", "seconds", "for", "mobile", "buyers", "in", "twelve",
        "regional", "markets", "overnight.",
    ];
    assert_eq!(words.len(), 30);
    let draft = words.join(" ");

    let state = offline_pipeline()
        .run(PipelineState::new(vec![], draft.as_str(), UserProfile::new(), ""))
        .unwrap();
    let weak = state.weak_sections();
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0].span, (0, draft.chars().count()));
}

#[test]
fn test_weak_spans_within_draft() {
    let draft = format!("{} This is a general overview of common things. {}", SEO_DRAFT, SEO_DRAFT);
    let state = offline_pipeline()
        .run(PipelineState::new(past_texts(), draft.as_str(), UserProfile::new(), ""))
        .unwrap();
    let len = draft.chars().count();
    assert!(!state.weak_sections().is_empty());
    for w in state.weak_sections() {
        assert!(w.start() <= w.end());
        assert!(w.end() <= len);
    }
}

#[test]
fn test_final_score_formula_and_range() {
    let profile = UserProfile::new().with_preferred_topics(["keyword research", "growth"]);
    let state = offline_pipeline()
        .run(PipelineState::new(past_texts(), SEO_DRAFT, profile, ""))
        .unwrap();
    let s = state.scores.unwrap();
    let expected = (0.4 * s.keyword_relevance + 0.3 * s.readability_norm + 0.3 * s.profile_alignment)
        .round_ties_even();
    assert_eq!(s.final_score as f64, expected);
    assert!(s.final_score <= 100);
    assert!(s.profile_alignment > 0.0);
}

#[test]
fn test_offline_runs_are_identical() {
    let pipeline = offline_pipeline();
    let initial = PipelineState::new(past_texts(), SEO_DRAFT, UserProfile::new(), "");
    let first = pipeline.run(initial.clone()).unwrap();
    let second = pipeline.run(initial).unwrap();
    assert_eq!(first.scores, second.scores);
    assert_eq!(first.weak_sections, second.weak_sections);
    assert_eq!(first.to_json(), second.to_json());
}

struct Unreliable {
    calls: Arc<AtomicU32>,
    failures: u32,
}

impl Stage for Unreliable {
    fn name(&self) -> &'static str {
        "unreliable"
    }

    fn reads(&self) -> &'static [StateKey] {
        &[StateKey::PastTexts]
    }

    fn writes(&self) -> &'static [StateKey] {
        &[StateKey::CorpusTopics]
    }

    fn run(&self, state: &PipelineState) -> anyhow::Result<StateDelta> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            anyhow::bail!("provider timeout on attempt {n}");
        }
        Ok(StateDelta {
            corpus_topics: Some(state.past_texts.clone()),
            ..Default::default()
        })
    }
}

fn retry_config() -> PipelineConfig {
    PipelineConfig {
        retries: 3,
        base_delay: Duration::from_millis(10),
        ..Default::default()
    }
}

#[test]
fn test_stage_recovers_within_retries() {
    let calls = Arc::new(AtomicU32::new(0));
    let pipeline = Pipeline::with_stages(
        retry_config(),
        vec![Box::new(Unreliable {
            calls: calls.clone(),
            failures: 2,
        })],
    )
    .unwrap();

    let state = pipeline
        .run(PipelineState::new(vec!["a".into()], "", UserProfile::new(), ""))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(state.corpus_topics(), &["a".to_string()]);
}

#[test]
fn test_exhausted_retries_abort_pipeline() {
    let calls = Arc::new(AtomicU32::new(0));
    let pipeline = Pipeline::with_stages(
        retry_config(),
        vec![Box::new(Unreliable {
            calls: calls.clone(),
            failures: 10,
        })],
    )
    .unwrap();

    let started = std::time::Instant::now();
    let result = pipeline.run(PipelineState::default());
    assert!(started.elapsed() >= Duration::from_millis(30));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    match result {
        Err(PipelineError::Stage { stage, source }) => {
            assert_eq!(stage, "unreliable");
            assert!(source.to_string().contains("attempt 3"));
        }
        other => panic!("expected stage error, got {other:?}"),
    }
}
