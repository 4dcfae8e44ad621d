//! Text metrics
//!
//! The pipeline talks to text analysis through the [`TextMetrics`] trait:
//!
//! - `sentiment` - positive / neutral / negative proportions
//! - `readability` - Flesch reading ease, with a fixed fallback
//! - `extract_terms` - top corpus terms by aggregate TF-IDF weight
//! - `similarity` - TF-IDF cosine similarity in [0, 1]
//! - `weak_spans` - long or generic sentences of a draft
//!
//! [`DefaultTextMetrics`] is a self-contained implementation. It keeps no
//! state between calls, so one instance can be shared across threads.

mod readability;
mod sentences;
mod sentiment;
mod stopwords;
mod tfidf;

pub use readability::{count_syllables, flesch_reading_ease};
pub use sentences::split_sentences;
pub use sentiment::polarity_scores;
pub use stopwords::is_stop_word;
pub use tfidf::{similarity, TfidfMatrix, TfidfVectorizer};

use crate::models::{ExtractedTerms, Sentiment, WeakSpan};

/// Readability reported when the formula is undefined (no words)
pub const DEFAULT_READABILITY: f64 = 60.0;
/// Fewest terms corpus extraction ever returns, when enough exist
pub const MIN_TOP_K: usize = 5;
/// Vocabulary cap for corpus term extraction
pub const MAX_CORPUS_FEATURES: usize = 5000;

pub const WEAK_SPAN_ISSUE: &str = "low specificity / long sentence";
pub const WEAK_SPAN_FIX_HINT: &str = "shorten and add concrete detail";

/// Text analysis used by the pipeline stages
pub trait TextMetrics: Send + Sync {
    fn sentiment(&self, text: &str) -> Sentiment;

    fn readability(&self, text: &str) -> f64;

    fn extract_terms(&self, texts: &[String], top_k: usize) -> ExtractedTerms;

    fn similarity(&self, a: &str, b: &str) -> f64;

    fn weak_spans(&self, text: &str) -> Vec<WeakSpan>;
}

/// Thresholds for flagging a sentence as weak
#[derive(Debug, Clone, PartialEq)]
pub struct WeakSpanRules {
    /// Sentences with more words than this are flagged
    pub max_sentence_words: usize,
    /// Sentences more similar than this to `generic_reference` are flagged
    pub generic_threshold: f64,
    pub generic_reference: String,
}

impl Default for WeakSpanRules {
    fn default() -> Self {
        Self {
            max_sentence_words: 28,
            generic_threshold: 0.35,
            generic_reference: "introduction overview general common things".to_string(),
        }
    }
}

impl WeakSpanRules {
    fn is_weak(&self, sentence: &str) -> bool {
        sentence.split_whitespace().count() > self.max_sentence_words
            || similarity(sentence, &self.generic_reference) > self.generic_threshold
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultTextMetrics {
    rules: WeakSpanRules,
}

impl DefaultTextMetrics {
    pub fn new(rules: WeakSpanRules) -> Self {
        Self { rules }
    }
}

impl TextMetrics for DefaultTextMetrics {
    fn sentiment(&self, text: &str) -> Sentiment {
        polarity_scores(text)
    }

    fn readability(&self, text: &str) -> f64 {
        flesch_reading_ease(text).unwrap_or(DEFAULT_READABILITY)
    }

    fn extract_terms(&self, texts: &[String], top_k: usize) -> ExtractedTerms {
        extract_terms(texts, top_k)
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        similarity(a, b)
    }

    fn weak_spans(&self, text: &str) -> Vec<WeakSpan> {
        find_weak_spans(text, &self.rules)
    }
}

/// Top terms over unigrams and bigrams of `texts`, stop words removed.
///
/// `top_k` is raised to [`MIN_TOP_K`]. The same ranking is used for topics
/// and keywords.
pub fn extract_terms(texts: &[String], top_k: usize) -> ExtractedTerms {
    if texts.is_empty() {
        return ExtractedTerms::default();
    }
    let vectorizer = TfidfVectorizer::new()
        .with_stop_words()
        .with_max_ngram(2)
        .with_max_features(MAX_CORPUS_FEATURES);
    let Some(matrix) = vectorizer.fit_transform(texts) else {
        return ExtractedTerms::default();
    };

    let k = top_k.max(MIN_TOP_K);
    let ranked: Vec<String> = matrix
        .ranked_terms()
        .into_iter()
        .take(k)
        .map(|(term, _)| term)
        .collect();
    ExtractedTerms {
        topics: ranked.clone(),
        keywords: ranked,
    }
}

/// Flag long or generic sentences of `text`.
///
/// Each sentence is located by searching forward from the end of the
/// previous one, so identical sentences map to successive occurrences.
/// Spans are character offsets.
pub fn find_weak_spans(text: &str, rules: &WeakSpanRules) -> Vec<WeakSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    let mut cursor_chars = 0;

    for sentence in split_sentences(text) {
        let Some(rel) = text[cursor..].find(sentence.as_str()) else {
            continue;
        };
        let start_byte = cursor + rel;
        let end_byte = start_byte + sentence.len();
        let start = cursor_chars + text[cursor..start_byte].chars().count();
        let end = start + sentence.chars().count();
        cursor = end_byte;
        cursor_chars = end;

        if rules.is_weak(&sentence) {
            spans.push(WeakSpan {
                span: (start, end),
                issue: WEAK_SPAN_ISSUE.to_string(),
                fix_hint: WEAK_SPAN_FIX_HINT.to_string(),
            });
        }
    }
    spans
}
