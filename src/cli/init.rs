//! Init command - write the example user config

use crate::config::UserConfig;
use anyhow::Result;
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(path: Option<&Path>) -> Result<()> {
    let (config_path, created) = match path {
        Some(path) => (path.to_path_buf(), UserConfig::write_example(path)?),
        None => {
            let path = UserConfig::user_config_path()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
            let created = UserConfig::write_example(&path)?;
            (path, created)
        }
    };

    if created {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    }

    println!("\nNext steps:");
    println!(
        "  {} Add an API key (or set OPENAI_API_KEY)",
        style(config_path.display()).cyan()
    );
    println!(
        "  {} Get suggestions for a draft",
        style("draftscope recommend draft.md").cyan()
    );

    Ok(())
}
