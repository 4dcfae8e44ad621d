//! Analyze command - per-text report over a corpus

use super::emit;
use crate::config::UserConfig;
use crate::corpus::load_past_texts;
use crate::nlp::DefaultTextMetrics;
use crate::report::CorpusReport;
use crate::reporters::{self, OutputFormat};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the analyze command
pub fn run(
    config: &UserConfig,
    files: &[PathBuf],
    corpus: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let texts = collect_texts(files, corpus)?;
    let pipeline_config = config.pipeline_config()?;
    let metrics = DefaultTextMetrics::new(pipeline_config.weak_spans.clone());

    let report = CorpusReport::build(&texts, &metrics, pipeline_config.top_k);
    info!(
        "Analyzed {} texts, {} corpus topics",
        report.results.len(),
        report.corpus_summary.topics.len()
    );

    let rendered = reporters::render_corpus(&report, format)?;
    emit(&rendered, output, format)
}

/// Corpus texts followed by the given files, in argument order
fn collect_texts(files: &[PathBuf], corpus: &Path) -> Result<Vec<String>> {
    let mut texts = load_past_texts(corpus)?;
    for file in files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        texts.push(text);
    }
    Ok(texts)
}
