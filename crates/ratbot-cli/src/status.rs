//! `ratbot status` — show configuration and collaborator status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use ratbot_core::config::{get_config_path, load_config};

fn key_status(configured: bool) -> String {
    if configured {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}

/// Run the status command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config = load_config(path);
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "🐀 Ratbot Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", config.agent.temperature).dimmed(),
        format!("{}", config.agent.max_tokens).dimmed(),
    );

    println!();
    println!("  {}", "Collaborators:".bold());
    println!(
        "    {:<20} {}",
        "OpenAI-compatible",
        key_status(config.providers.openai.is_configured())
    );
    println!(
        "    {:<20} {}",
        "Composio",
        key_status(config.tools.is_configured())
    );

    println!();
    println!("  {:<18} {}", "Tool scope:".bold(), config.tools.scope.join(", "));
    println!(
        "  {:<18} {}",
        "Max rounds:".bold(),
        config.tools.effective_max_rounds()
    );
    println!(
        "  {:<18} {}",
        "Support role:".bold(),
        config.support.role_id.as_deref().unwrap_or("(none)")
    );
    println!(
        "  {:<18} {}",
        "History query:".bold(),
        if config.features.chat_history_query {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();

    Ok(())
}
