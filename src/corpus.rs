//! Flat-file corpus of past texts
//!
//! The corpus file is a JSON array of strings. A missing file is an empty
//! corpus, not an error.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory when no corpus is given
pub const DEFAULT_CORPUS_FILE: &str = "past_texts.json";

pub fn default_corpus_path() -> PathBuf {
    PathBuf::from(DEFAULT_CORPUS_FILE)
}

/// Load past texts from `path`
pub fn load_past_texts(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!("No corpus at {}, using an empty corpus", path.display());
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus {}", path.display()))?;
    let texts: Vec<String> = serde_json::from_str(&content).with_context(|| {
        format!(
            "Corpus {} must be a JSON array of strings",
            path.display()
        )
    })?;

    debug!("Loaded {} past texts from {}", texts.len(), path.display());
    Ok(texts)
}
