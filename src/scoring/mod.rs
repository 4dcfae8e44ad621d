//! Draft Quality Scoring
//!
//! Fuses three independent signals into one 0-100 score.
//!
//! # Scoring Formula
//!
//! ```text
//! Final Score = round(Relevance × W₁ + Readability × W₂ + Alignment × W₃)
//!
//! Where:
//!   Relevance   = clamp(100 × tfidf_cosine(draft, suggested phrases), 0, 100)
//!   Readability = clamp(flesch_reading_ease(draft), 0, 100)
//!   Alignment   = clamp(100 × tfidf_cosine(draft, preferred topics), 0, 100)
//! ```
//!
//! Default weights are W₁ = 0.4, W₂ = 0.3, W₃ = 0.3. Halves round to the
//! even integer, so 16.5 scores 16 and 17.5 scores 18.
//!
//! # Degenerate inputs
//!
//! - No suggestions or a blank draft → relevance 0
//! - No preferred topics → alignment 0
//! - Draft without words → readability falls back to 60
//!
//! # Example
//!
//! A draft with relevance 50, readability 70 and no profile:
//!
//! Final = round(50 × 0.4 + 70 × 0.3 + 0 × 0.3) = round(41.0) = 41

mod draft_scorer;

pub use draft_scorer::{clamp_0_100, DraftScorer, ScoreWeights};
