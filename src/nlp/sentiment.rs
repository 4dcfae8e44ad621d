//! Lexicon-based polarity scoring
//!
//! Each word gets a valence from a small built-in lexicon. Negators flip and
//! dampen the valence of the next sentiment word within three tokens, and
//! boosters amplify it. The valences are then turned into proportions:
//!
//! ```text
//! positive word  -> pos_sum += valence + 1
//! negative word  -> neg_sum += valence - 1
//! neutral word   -> neutral += 1
//! proportion     =  part / (pos_sum + |neg_sum| + neutral)
//! ```

use crate::models::Sentiment;
use std::collections::HashMap;
use std::sync::OnceLock;

const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const NEGATION_WINDOW: usize = 3;

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("benefit", 1.6),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("clear", 1.6),
    ("confident", 2.2),
    ("delight", 2.9),
    ("easy", 1.9),
    ("effective", 2.1),
    ("enjoy", 2.2),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("fantastic", 2.6),
    ("fun", 2.3),
    ("good", 1.9),
    ("great", 3.1),
    ("growth", 1.4),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("hope", 1.9),
    ("important", 0.8),
    ("improve", 1.9),
    ("improved", 2.1),
    ("inspiring", 2.3),
    ("interesting", 1.7),
    ("like", 1.5),
    ("love", 3.2),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("positive", 2.6),
    ("powerful", 1.8),
    ("recommend", 1.5),
    ("reliable", 1.9),
    ("simple", 1.0),
    ("smart", 1.7),
    ("strong", 2.3),
    ("success", 2.7),
    ("successful", 2.8),
    ("thank", 1.5),
    ("useful", 1.9),
    ("valuable", 2.1),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worth", 0.9),
    ("angry", -2.3),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broken", -2.1),
    ("confusing", -1.3),
    ("difficult", -1.5),
    ("disappoint", -2.3),
    ("disappointing", -2.2),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fear", -2.2),
    ("frustrating", -1.9),
    ("hard", -0.4),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("loss", -1.3),
    ("mistake", -1.6),
    ("negative", -2.3),
    ("pain", -2.3),
    ("poor", -2.1),
    ("problem", -1.7),
    ("risk", -1.1),
    ("sad", -2.1),
    ("slow", -1.2),
    ("terrible", -2.1),
    ("ugly", -2.3),
    ("unfortunately", -1.5),
    ("useless", -1.8),
    ("waste", -1.8),
    ("weak", -1.9),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "dont",
    "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't", "wasnt", "wasn't",
    "wont", "won't", "cant", "can't", "without",
];

const BOOSTERS: &[&str] = &[
    "very", "really", "extremely", "incredibly", "highly", "so", "totally", "absolutely",
    "particularly", "especially",
];

static LEXICON_MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();

fn lexicon() -> &'static HashMap<&'static str, f64> {
    LEXICON_MAP.get_or_init(|| LEXICON.iter().copied().collect())
}

fn normalize(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

/// Polarity proportions of `text`, each rounded to four decimals.
///
/// Text without words is fully neutral.
pub fn polarity_scores(text: &str) -> Sentiment {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Sentiment::NEUTRAL;
    }

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neutral = 0.0;

    for (i, token) in tokens.iter().enumerate() {
        let Some(&base) = lexicon().get(token.as_str()) else {
            neutral += 1.0;
            continue;
        };
        let mut valence = base;

        if i > 0 && BOOSTERS.contains(&tokens[i - 1].as_str()) {
            valence += BOOSTER_INCREMENT * base.signum();
        }
        let window_start = i.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..i]
            .iter()
            .any(|t| NEGATORS.contains(&t.as_str()))
        {
            valence *= NEGATION_SCALAR;
        }

        if valence > 0.0 {
            pos_sum += valence + 1.0;
        } else if valence < 0.0 {
            neg_sum += valence - 1.0;
        } else {
            neutral += 1.0;
        }
    }

    let total = pos_sum + neg_sum.abs() + neutral;
    let round4 = |x: f64| (x * 10_000.0).round() / 10_000.0;
    Sentiment {
        positive: round4(pos_sum / total),
        neutral: round4(neutral / total),
        negative: round4(neg_sum.abs() / total),
    }
}
