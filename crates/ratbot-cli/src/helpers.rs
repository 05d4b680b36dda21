//! Shared CLI helpers — path expansion, banner, progress placeholder.

use std::path::PathBuf;

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the banner shown at REPL start.
pub fn print_banner(channel: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🐀 Ratbot".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("Channel #{channel}. Type a message, or \"exit\" to quit.").dimmed()
    );
    println!();
}

/// The placeholder shown while a message is processed.
pub fn print_thinking() {
    eprint!("{}", "Hmm... processing your request! 🐀".dimmed());
}

/// Clear the placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/bot/config.json");
        assert!(result.ends_with("bot/config.json"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        let result = expand_tilde("/etc/ratbot.json");
        assert_eq!(result, PathBuf::from("/etc/ratbot.json"));
    }

    #[test]
    fn expand_tilde_bare() {
        let result = expand_tilde("~");
        assert!(!result.to_string_lossy().contains('~'));
    }
}
