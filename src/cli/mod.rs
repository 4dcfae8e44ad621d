//! CLI command definitions and handlers

mod analyze;
mod init;
mod recommend;

use crate::config::UserConfig;
use crate::reporters::OutputFormat;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// draftscope - corpus-aware writing assistant
///
/// Works offline. A model API key only sharpens the suggestions.
#[derive(Parser, Debug)]
#[command(name = "draftscope")]
#[command(
    version,
    about = "Corpus-aware writing assistant: phrase suggestions, weak sentences and a draft score",
    long_about = "draftscope mines your past posts for topics and keywords, flags long or \
generic sentences in a draft, asks a language model to refine phrase suggestions, \
and scores the draft on relevance, readability and fit with your preferred topics.\n\n\
Without an API key it runs fully offline and suggests your corpus keywords.",
    after_help = "\
Examples:
  draftscope recommend draft.md                          Recommend phrases for a draft
  cat draft.md | draftscope recommend -                  Read the draft from stdin
  draftscope recommend draft.md --format json            JSON output for editor plugins
  draftscope recommend draft.md --profile '{\"preferred_topics\": [\"seo\"]}'
  draftscope analyze --corpus past_texts.json            Analyze your past posts
  draftscope init                                        Write an example config"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ~/.config/draftscope/config.toml)
    #[arg(long, global = true, env = "DRAFTSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest phrases for a draft, flag weak sentences and score it
    Recommend {
        /// Draft file, or '-' to read from stdin
        draft: String,

        /// Past texts: a JSON array of strings
        #[arg(long, default_value = crate::corpus::DEFAULT_CORPUS_FILE)]
        corpus: PathBuf,

        /// User profile as a JSON object, or a path to a JSON file
        #[arg(long)]
        profile: Option<String>,

        /// Text around the editor cursor
        #[arg(long, default_value = "")]
        cursor_context: String,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Never call a model API, even when a key is configured
        #[arg(long)]
        offline: bool,
    },

    /// Analyze past texts: sentiment, topics, keywords and readability
    Analyze {
        /// Text files to analyze in addition to the corpus
        files: Vec<PathBuf>,

        /// Past texts: a JSON array of strings
        #[arg(long, default_value = crate::corpus::DEFAULT_CORPUS_FILE)]
        corpus: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Create the user config file with example settings
    Init {
        /// Write to this path instead of the user config directory
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => init::run(path.as_deref()),

        Commands::Recommend {
            draft,
            corpus,
            profile,
            cursor_context,
            format,
            output,
            offline,
        } => {
            let config = load_config(cli.config.as_deref())?;
            recommend::run(
                &config,
                &draft,
                &corpus,
                profile.as_deref(),
                &cursor_context,
                format.parse()?,
                output.as_deref(),
                offline,
            )
        }

        Commands::Analyze {
            files,
            corpus,
            format,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            analyze::run(&config, &files, &corpus, format.parse()?, output.as_deref())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<UserConfig> {
    match path {
        Some(path) => UserConfig::load_from(path),
        None => UserConfig::load(),
    }
}

/// Print to stdout, or write to `output` when given
fn emit(rendered: &str, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} report to {}",
                console::style("✓").green(),
                format,
                console::style(path.display()).cyan()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
