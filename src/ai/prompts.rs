//! Prompt templates for suggestion refinement

use crate::models::{Suggestion, UserProfile};
use regex::Regex;
use std::sync::OnceLock;

/// System prompt sent alongside the refinement prompt
pub const REFINE_SYSTEM_PROMPT: &str = "You are an editorial assistant for a blog writer. \
     You suggest short, concrete phrases the writer can insert into their draft. \
     Always answer with a single JSON object and nothing else.";

/// Builder for the refinement prompt
#[derive(Debug, Clone, Default)]
pub struct RefinePromptBuilder {
    draft: String,
    topics: Vec<String>,
    baseline: Vec<Suggestion>,
    profile: UserProfile,
}

impl RefinePromptBuilder {
    pub fn new(draft: impl Into<String>) -> Self {
        Self {
            draft: draft.into(),
            ..Default::default()
        }
    }

    pub fn topics(mut self, topics: &[String]) -> Self {
        self.topics = topics.to_vec();
        self
    }

    pub fn baseline(mut self, baseline: &[Suggestion]) -> Self {
        self.baseline = baseline.to_vec();
        self
    }

    pub fn profile(mut self, profile: &UserProfile) -> Self {
        self.profile = profile.clone();
        self
    }

    pub fn build(self) -> String {
        let topics = serde_json::to_string(&self.topics).unwrap_or_else(|_| "[]".to_string());
        let baseline =
            serde_json::to_string(&self.baseline).unwrap_or_else(|_| "[]".to_string());
        let profile = serde_json::to_string(&self.profile).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"Task: Suggest 3-5 precise, inline-ready keywords/phrases to insert next in the draft; refine based on corpus topics and user profile.
Inputs:
- Draft: {draft}
- Corpus topics: {topics}
- Baseline suggestions: {baseline}
- Profile: {profile}
Output JSON with keys: suggestions (array of objects with phrase, rank, why).
"#,
            draft = sanitize_text(&self.draft),
        )
    }
}

/// Redact instructions embedded in user text that try to steer the model
fn sanitize_text(text: &str) -> String {
    static INJECTION_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

    let patterns = INJECTION_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)ignore\s+(all\s+)?previous\s+instructions?").expect("valid regex"),
            Regex::new(r"(?i)disregard\s+(all\s+)?previous").expect("valid regex"),
            Regex::new(r"(?i)<\s*/?\s*system\s*>").expect("valid regex"),
        ]
    });

    let mut result = text.to_string();
    for pattern in patterns {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }
    result
}
