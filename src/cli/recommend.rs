//! Recommend command - run the pipeline on one draft

use super::emit;
use crate::ai::{
    count_tokens, AiClient, CompletionProvider, LiveCompletion, OfflineCompletion,
    DEFAULT_TOKENIZER_MODEL,
};
use crate::config::UserConfig;
use crate::corpus::load_past_texts;
use crate::models::UserProfile;
use crate::pipeline::{Pipeline, PipelineState};
use crate::report::RecommendReport;
use crate::reporters::{self, OutputFormat};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Run the recommend command
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &UserConfig,
    draft: &str,
    corpus: &Path,
    profile: Option<&str>,
    cursor_context: &str,
    format: OutputFormat,
    output: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let draft = read_draft(draft)?;
    let profile = match profile {
        Some(arg) => parse_profile(arg)?,
        None => UserProfile::new(),
    };
    let past_texts = load_past_texts(corpus)?;

    let pipeline_config = config.pipeline_config()?;
    let (completion, warning) =
        select_completion(config, offline, &pipeline_config.tokenizer_model)?;

    let mut warnings: Vec<String> = warning.into_iter().collect();
    if past_texts.is_empty() {
        warnings.push(format!(
            "Corpus {} is empty or missing; no baseline suggestions",
            corpus.display()
        ));
    }

    let pipeline = Pipeline::from_config(pipeline_config, completion);
    let initial = PipelineState::new(past_texts, draft.as_str(), profile, cursor_context);
    let state = pipeline.run(initial)?;

    let report = warnings
        .into_iter()
        .fold(RecommendReport::from_state(&state, draft_tokens(&draft)), |r, w| {
            r.with_warning(w)
        });

    let rendered = reporters::render_recommend(&report, format)?;
    emit(&rendered, output, format)
}

/// Draft tokens are always counted with the default tokenizer, not the
/// refiner's model
fn draft_tokens(draft: &str) -> u64 {
    count_tokens(draft, DEFAULT_TOKENIZER_MODEL) as u64
}

/// Live model when a credential is available, offline placeholder otherwise
fn select_completion(
    config: &UserConfig,
    offline: bool,
    tokenizer_model: &str,
) -> Result<(Arc<dyn CompletionProvider>, Option<String>)> {
    if offline {
        debug!("Offline mode requested");
        return Ok((Arc::new(OfflineCompletion::new(tokenizer_model)), None));
    }

    let backend = config.backend()?;
    if !config.has_credential() {
        let warning = format!(
            "No API key for {:?}; set {} for refined suggestions. Using corpus keywords.",
            backend,
            backend.env_key()
        );
        return Ok((Arc::new(OfflineCompletion::new(tokenizer_model)), Some(warning)));
    }

    let client = AiClient::from_config(config.ai_config()?, config.api_key())
        .context("Failed to create completion client")?;
    info!("Refining with {:?} ({})", client.backend(), client.model());
    Ok((Arc::new(LiveCompletion::new(client)), None))
}

fn read_draft(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read draft from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(arg).with_context(|| format!("Failed to read draft {}", arg))
}

/// Inline JSON object, or a path to a file holding one
fn parse_profile(arg: &str) -> Result<UserProfile> {
    let trimmed = arg.trim_start();
    let content = if trimmed.starts_with('{') {
        arg.to_string()
    } else {
        std::fs::read_to_string(arg).with_context(|| format!("Failed to read profile {}", arg))?
    };
    serde_json::from_str(&content).context("Profile must be a JSON object")
}
