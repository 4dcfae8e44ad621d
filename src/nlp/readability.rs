//! Flesch reading ease
//!
//! ```text
//! FRE = 206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)
//! ```
//!
//! Higher is easier. Typical prose lands between 30 and 80; very short
//! words can push it above 100 and dense jargon below 0.

use super::sentences::split_sentences;

/// Reading ease of `text`, rounded to two decimals.
///
/// `None` when the text has no words, since the ratios are undefined.
pub fn flesch_reading_ease(text: &str) -> Option<f64> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(strip_punctuation)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    let sentences = split_sentences(text).len().max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let n_words = words.len() as f64;
    let score = 206.835
        - 1.015 * (n_words / sentences as f64)
        - 84.6 * (syllables as f64 / n_words);
    Some((score * 100.0).round() / 100.0)
}

fn strip_punctuation(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
        .collect()
}

/// Vowel-group syllable estimate with a silent trailing `e` rule
pub fn count_syllables(word: &str) -> usize {
    let lower: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if lower.is_empty() {
        return 0;
    }
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &lower {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    let n = lower.len();
    if n > 2 && lower[n - 1] == 'e' && !is_vowel(lower[n - 2]) {
        // "-le" after a consonant keeps its syllable (table, simple)
        let keeps = lower[n - 2] == 'l' && n > 3 && !is_vowel(lower[n - 3]);
        if !keeps && count > 1 {
            count -= 1;
        }
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("important"), 3);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("42"), 0);
    }

    #[test]
    fn test_empty_text_is_undefined() {
        assert_eq!(flesch_reading_ease(""), None);
        assert_eq!(flesch_reading_ease("  ... !! "), None);
    }

    #[test]
    fn test_simple_text_scores_higher_than_dense_text() {
        let simple = flesch_reading_ease("The cat sat. The dog ran. We had fun.").expect("score");
        let dense = flesch_reading_ease(
            "Organizational communication effectiveness necessitates comprehensive \
             interdepartmental collaboration methodologies.",
        )
        .expect("score");
        assert!(simple > dense);
        assert!(simple > 90.0);
        assert!(dense < 0.0);
    }
}
