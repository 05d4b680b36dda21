//! Utility helpers — path resolution, timestamps, string manipulation.

use std::path::PathBuf;

/// Get the Ratbot data directory (`$RATBOT_HOME`, else `~/.ratbot/`).
pub fn get_data_path() -> PathBuf {
    if let Ok(dir) = std::env::var("RATBOT_HOME") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".ratbot")
}

/// Get current local time formatted for display (e.g. embed footers).
pub fn display_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
