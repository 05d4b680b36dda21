//! `ratbot onboard` — write the default configuration.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use ratbot_core::config::{get_config_path, save_config, Config};

/// Run the onboard command.
pub fn run(path: Option<&Path>) -> Result<()> {
    println!();
    println!("{}", "🐀 Ratbot — Setup".cyan().bold());
    println!();

    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = ratbot_core::utils::get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)?;

    println!();
    println!(
        "{}",
        "  Set OPENAI_API_KEY (and COMPOSIO_API_KEY for tool calls), then run `ratbot chat`."
            .green()
    );
    println!();

    Ok(())
}

/// Write the default config unless a file already exists. Returns whether
/// a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
