//! TF-IDF vectorizer
//!
//! Term weighting follows the usual smoothed formulation:
//!
//! ```text
//! idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//! w(t, d)  = count(t, d) * idf(t)
//! ```
//!
//! Document vectors are L2-normalized, so cosine similarity is a dot product.
//! The vocabulary is kept in alphabetical order, which also serves as the
//! tie-break when ranking terms.

use super::stopwords::is_stop_word;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid regex"))
}

/// Vectorizer settings
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    remove_stop_words: bool,
    max_ngram: usize,
    max_features: Option<usize>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            remove_stop_words: false,
            max_ngram: 1,
            max_features: None,
        }
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop_words(mut self) -> Self {
        self.remove_stop_words = true;
        self
    }

    /// Include n-grams up to `n` words long (minimum 1)
    pub fn with_max_ngram(mut self, n: usize) -> Self {
        self.max_ngram = n.max(1);
        self
    }

    pub fn with_max_features(mut self, limit: usize) -> Self {
        self.max_features = Some(limit);
        self
    }

    /// Split a document into the terms the vectorizer counts.
    ///
    /// Stop words are dropped before n-grams are formed.
    pub fn analyze(&self, doc: &str) -> Vec<String> {
        let lowered = doc.to_lowercase();
        let tokens: Vec<&str> = token_pattern()
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !(self.remove_stop_words && is_stop_word(t)))
            .collect();

        let mut terms = Vec::with_capacity(tokens.len() * self.max_ngram);
        for n in 1..=self.max_ngram {
            if tokens.len() < n {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Fit on `docs` and return their weighted vectors.
    ///
    /// Returns `None` when no document contributes a single term.
    pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> Option<TfidfMatrix> {
        let counts: Vec<HashMap<String, usize>> = docs
            .iter()
            .map(|doc| {
                let mut c = HashMap::new();
                for term in self.analyze(doc.as_ref()) {
                    *c.entry(term).or_insert(0) += 1;
                }
                c
            })
            .collect();

        // term -> (document frequency, corpus frequency)
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for doc in &counts {
            for (term, &n) in doc {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += n;
            }
        }
        if stats.is_empty() {
            return None;
        }

        if let Some(limit) = self.max_features {
            if stats.len() > limit {
                let mut by_freq: Vec<(&str, usize)> =
                    stats.iter().map(|(t, (_, tf))| (*t, *tf)).collect();
                by_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                let keep: std::collections::HashSet<&str> =
                    by_freq.into_iter().take(limit).map(|(t, _)| t).collect();
                stats.retain(|t, _| keep.contains(t));
            }
        }

        let n_docs = docs.len() as f64;
        let vocabulary: Vec<String> = stats.keys().map(|t| t.to_string()).collect();
        let index: HashMap<&str, usize> = stats
            .keys()
            .enumerate()
            .map(|(i, t)| (*t, i))
            .collect();
        let idf: Vec<f64> = stats
            .values()
            .map(|(df, _)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: Vec<(usize, f64)> = doc
                    .iter()
                    .filter_map(|(term, &n)| {
                        index
                            .get(term.as_str())
                            .map(|&col| (col, n as f64 * idf[col]))
                    })
                    .collect();
                row.sort_by_key(|(col, _)| *col);
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        Some(TfidfMatrix { vocabulary, rows })
    }
}

/// Sparse, row-normalized document-term matrix
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    vocabulary: Vec<String>,
    /// Per document, (column, weight) sorted by column
    rows: Vec<Vec<(usize, f64)>>,
}

impl TfidfMatrix {
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Sum of each term's weight over all documents, highest first.
    /// Equal weights are ordered alphabetically.
    pub fn ranked_terms(&self) -> Vec<(String, f64)> {
        let mut sums = vec![0.0; self.vocabulary.len()];
        for row in &self.rows {
            for &(col, w) in row {
                sums[col] += w;
            }
        }
        let mut ranked: Vec<(String, f64)> = self
            .vocabulary
            .iter()
            .cloned()
            .zip(sums)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Cosine similarity between two documents of the matrix
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let (Some(ra), Some(rb)) = (self.rows.get(a), self.rows.get(b)) else {
            return 0.0;
        };
        let (mut i, mut j, mut dot) = (0, 0, 0.0);
        while i < ra.len() && j < rb.len() {
            match ra[i].0.cmp(&rb[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += ra[i].1 * rb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }
}

/// TF-IDF cosine similarity of two texts, fitted on the pair alone.
///
/// Blank input on either side yields 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }
    match TfidfVectorizer::new().fit_transform(&[a, b]) {
        Some(matrix) => matrix.cosine(0, 1),
        None => 0.0,
    }
}
