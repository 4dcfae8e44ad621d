//! Token counting for prompts and completions
//!
//! Uses the model's BPE encoding when tiktoken knows the model, and the
//! `cl100k_base` encoding otherwise. Encodings are loaded once per process.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Model for draft and corpus text counts, independent of the refiner's model
pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-3.5-turbo";
/// Encoding used for models tiktoken does not recognise
pub const FALLBACK_ENCODING: &str = "cl100k_base";

/// Average characters per token, used only if no encoding can be loaded
const CHARS_PER_TOKEN: usize = 4;

static ENCODINGS: OnceLock<Mutex<HashMap<String, Option<CoreBPE>>>> = OnceLock::new();

fn load_encoding(model: &str) -> Option<CoreBPE> {
    if model == FALLBACK_ENCODING {
        return tiktoken_rs::cl100k_base().ok();
    }
    match tiktoken_rs::get_bpe_from_model(model) {
        Ok(bpe) => Some(bpe),
        Err(e) => {
            debug!("No encoding for model {}: {}; using {}", model, e, FALLBACK_ENCODING);
            tiktoken_rs::cl100k_base().ok()
        }
    }
}

/// Number of tokens `text` occupies for `model`
pub fn count_tokens(text: &str, model: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let cache = ENCODINGS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = match cache.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let encoding = guard
        .entry(model.to_string())
        .or_insert_with(|| load_encoding(model));

    match encoding {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.chars().count().div_ceil(CHARS_PER_TOKEN),
    }
}
