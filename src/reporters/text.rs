//! Text (terminal) reporter with colors and formatting

use crate::models::Sentiment;
use crate::report::{CorpusReport, RecommendReport};
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const YELLOW: &str = "\x1b[33m";

/// Render a recommendation as formatted terminal output
pub fn render_recommend(report: &RecommendReport) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}Draft Recommendations{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Readability: {}  Relevance: {:.2}\n\n",
        format_score(report.final_score as f64),
        format_score(report.readability),
        report.relevance
    ));

    // Suggestions
    out.push_str(&format!(
        "{BOLD}SUGGESTIONS{RESET} ({})\n",
        report.suggestions.len()
    ));
    if report.suggestions.is_empty() {
        out.push_str(&format!("  {DIM}none{RESET}\n"));
    }
    for s in &report.suggestions {
        out.push_str(&format!(
            "  {DIM}{:>3}{RESET}  {:<32}  {DIM}{}{RESET}\n",
            s.rank,
            truncate(&s.phrase, 32),
            s.why
        ));
    }
    out.push('\n');

    // Weak sections
    if !report.weak_sections.is_empty() {
        out.push_str(&format!(
            "{BOLD}WEAK SECTIONS{RESET} ({})\n",
            report.weak_sections.len()
        ));
        for w in &report.weak_sections {
            out.push_str(&format!(
                "  {YELLOW}{:>5}..{:<5}{RESET}  {}  {DIM}({}){RESET}\n",
                w.start(),
                w.end(),
                w.issue,
                w.fix_hint
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{DIM}Tokens: {} in / {} out ({} total){RESET}\n",
        report.estimated_token_cost.input_tokens,
        report.estimated_token_cost.output_tokens,
        report.token_usage.total
    ));

    for warning in &report.warnings {
        out.push_str(&format!("{YELLOW}warning:{RESET} {}\n", warning));
    }

    Ok(out)
}

/// Render a corpus analysis as formatted terminal output
pub fn render_corpus(report: &CorpusReport) -> Result<String> {
    let mut out = String::new();
    let summary = &report.corpus_summary;

    out.push_str(&format!("\n{BOLD}Corpus Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Texts: {}  Sentiment: {}\n\n",
        report.results.len(),
        format_sentiment(&summary.sentiment)
    ));

    out.push_str(&format!("{BOLD}TOP TOPICS{RESET}\n"));
    if summary.topics.is_empty() {
        out.push_str(&format!("  {DIM}none{RESET}\n"));
    } else {
        out.push_str(&format!("  {}\n", summary.topics.join(", ")));
    }
    out.push('\n');

    if !report.results.is_empty() {
        out.push_str(&format!(
            "{DIM}  #   READ    SENTIMENT (+/=/-)     TOKENS{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ──────────────────────────────────────────{RESET}\n"
        ));
        for (i, item) in report.results.iter().enumerate() {
            out.push_str(&format!(
                "  {DIM}{:>3}{RESET}  {:>6.2}  {:<20}  {:>6}\n",
                i + 1,
                item.readability,
                format_sentiment(&item.sentiment),
                item.token_usage.total
            ));
        }
    }

    Ok(out)
}

fn format_sentiment(s: &Sentiment) -> String {
    format!("{:.2}/{:.2}/{:.2}", s.positive, s.neutral, s.negative)
}

/// Truncate on char boundaries
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Format score with color
fn format_score(score: f64) -> String {
    let color = if score >= 80.0 {
        "\x1b[32m"
    } else if score >= 60.0 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    };
    format!("{color}{:.0}{RESET}", score)
}
