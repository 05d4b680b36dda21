//! Interactive REPL with per-channel message history.
//!
//! Uses `rustyline` for readline-style editing with persistent input history.
//! Every message is recorded in the channel's bounded history before it is
//! processed, so the pipeline sees the messages that preceded it.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use ratbot_agent::Pipeline;
use ratbot_core::config::Config;
use ratbot_core::history::ChannelHistories;
use ratbot_core::Message;

use crate::{helpers, render};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Run the interactive REPL loop.
pub async fn run(pipeline: Pipeline, config: &Config, author: &str, channel: &str) -> Result<()> {
    helpers::print_banner(channel);

    let histories = ChannelHistories::new(config.history.capacity);
    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline(&format!("{author}: ")) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        let message = Message::new(author, trimmed);
        let previous = histories.record(channel, message.clone());
        debug!(channel, previous = previous.len(), "processing input");

        helpers::print_thinking();
        let state = pipeline.run(message, previous).await;
        helpers::clear_thinking();

        render::print_action(trimmed, state.final_action.as_ref());
    }

    save_history(&mut editor);
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the input history file.
fn history_path() -> std::path::PathBuf {
    ratbot_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello there"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn history_path_ends_with_file() {
        let path = history_path();
        assert!(path.ends_with("history/cli_history"));
    }
}
