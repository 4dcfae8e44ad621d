//! Sentence tokenizer
//!
//! Splits on terminal punctuation followed by whitespace or end of text.
//! A period after a known abbreviation, a numbered `No.` or a name initial
//! does not end a sentence. Returned sentences are trimmed substrings of the input.

use regex::Regex;
use std::sync::OnceLock;

static BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();

fn boundary_pattern() -> &'static Regex {
    BOUNDARY_RE.get_or_init(|| {
        Regex::new(r#"[.!?]+["'\u{201D}\u{2019})\]]*(?:\s+|$)"#).expect("valid regex")
    })
}

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "co", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    "approx", "fig",
];

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn is_initial(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
}

/// Whether the period between `prefix` and `rest` belongs to an abbreviation
///
/// `No.` only counts before a number. A lone capital counts as an initial
/// when a capitalized word follows and either the word before it is
/// capitalized or the next word is another initial.
fn is_abbreviation_period(prefix: &str, rest: &str) -> bool {
    let mut words = prefix.rsplit(|c: char| c.is_whitespace() || c == '(');
    let last_word = words.next().unwrap_or("");
    let next_word = rest.split_whitespace().next().unwrap_or("");

    if is_initial(last_word) {
        let next_is_initial =
            next_word.ends_with('.') && is_initial(next_word.trim_end_matches('.'));
        let before = words.find(|w| !w.is_empty());
        return starts_uppercase(next_word)
            && (next_is_initial || before.map_or(true, starts_uppercase));
    }

    let lowered = last_word.to_lowercase();
    if lowered == "no" {
        return next_word.starts_with(|c: char| c.is_ascii_digit());
    }
    ABBREVIATIONS.contains(&lowered.as_str())
}

/// Split `text` into sentences
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in boundary_pattern().find_iter(text) {
        let terminator_at = m.start();
        let punct_is_period = text[terminator_at..].starts_with('.');
        if punct_is_period
            && is_abbreviation_period(&text[start..terminator_at], &text[m.end()..])
        {
            continue;
        }
        let candidate = text[start..m.end()].trim();
        if !candidate.is_empty() {
            sentences.push(candidate.to_string());
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
