//! JSON reporter
//!
//! Outputs reports as pretty-printed JSON for piping to jq or editor plugins.

use anyhow::Result;
use serde::Serialize;

/// Render any report as JSON
pub fn render<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
