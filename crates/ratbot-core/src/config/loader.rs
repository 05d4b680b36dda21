//! Config loader — reads `~/.ratbot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.ratbot/config.json`
//! 3. Well-known API key variables (`OPENAI_API_KEY`, `COMPOSIO_API_KEY`)
//! 4. Environment variables `RATBOT_<SECTION>__<FIELD>` (override everything)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `OPENAI_API_KEY` → `providers.openai.api_key` (only if unset in the file)
/// - `COMPOSIO_API_KEY` → `tools.api_key` (only if unset in the file)
/// - `RATBOT_AGENT__MODEL` → `agent.model`
/// - `RATBOT_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `RATBOT_AGENT__TEMPERATURE` → `agent.temperature`
/// - `RATBOT_PROVIDERS__OPENAI__API_KEY` → `providers.openai.api_key`
/// - `RATBOT_PROVIDERS__OPENAI__API_BASE` → `providers.openai.api_base`
/// - `RATBOT_TOOLS__API_KEY` → `tools.api_key`
/// - `RATBOT_TOOLS__API_BASE` → `tools.api_base`
/// - `RATBOT_TOOLS__SCOPE` → `tools.scope` (comma separated)
/// - `RATBOT_TOOLS__MAX_ROUNDS` → `tools.max_rounds`
/// - `RATBOT_SUPPORT__DOMAIN` → `support.domain`
/// - `RATBOT_SUPPORT__ROLE_ID` → `support.role_id`
/// - `RATBOT_FEATURES__CHAT_HISTORY_QUERY` → `features.chat_history_query`
/// - `RATBOT_HISTORY__CAPACITY` → `history.capacity`
fn apply_env_overrides(mut config: Config) -> Config {
    if config.providers.openai.api_key.is_empty() {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            config.providers.openai.api_key = val;
        }
    }
    if config.tools.api_key.is_empty() {
        if let Ok(val) = std::env::var("COMPOSIO_API_KEY") {
            config.tools.api_key = val;
        }
    }

    // Agent
    if let Ok(val) = std::env::var("RATBOT_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Ok(val) = std::env::var("RATBOT_AGENT__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agent.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("RATBOT_AGENT__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.agent.temperature = t;
        }
    }

    // Provider
    if let Ok(val) = std::env::var("RATBOT_PROVIDERS__OPENAI__API_KEY") {
        config.providers.openai.api_key = val;
    }
    if let Ok(val) = std::env::var("RATBOT_PROVIDERS__OPENAI__API_BASE") {
        config.providers.openai.api_base = Some(val);
    }

    // Tools
    if let Ok(val) = std::env::var("RATBOT_TOOLS__API_KEY") {
        config.tools.api_key = val;
    }
    if let Ok(val) = std::env::var("RATBOT_TOOLS__API_BASE") {
        config.tools.api_base = val;
    }
    if let Ok(val) = std::env::var("RATBOT_TOOLS__SCOPE") {
        config.tools.scope = parse_list(&val);
    }
    if let Ok(val) = std::env::var("RATBOT_TOOLS__MAX_ROUNDS") {
        if let Ok(n) = val.parse::<u32>() {
            config.tools.max_rounds = n;
        }
    }

    // Support
    if let Ok(val) = std::env::var("RATBOT_SUPPORT__DOMAIN") {
        config.support.domain = val;
    }
    if let Ok(val) = std::env::var("RATBOT_SUPPORT__ROLE_ID") {
        config.support.role_id = Some(val);
    }

    // Features / history
    if let Ok(val) = std::env::var("RATBOT_FEATURES__CHAT_HISTORY_QUERY") {
        config.features.chat_history_query = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("RATBOT_HISTORY__CAPACITY") {
        if let Ok(n) = val.parse::<usize>() {
            config.history.capacity = n;
        }
    }

    config
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.agent.max_tokens, 4096);
        assert_eq!(config.tools.max_rounds, 5);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "agent": { "model": "gpt-4o", "maxTokens": 2048 },
            "tools": { "scope": ["GMAIL", "SLACK"], "maxRounds": 3 }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.agent.max_tokens, 2048);
        assert_eq!(config.tools.scope, vec!["GMAIL", "SLACK"]);
        assert_eq!(config.tools.effective_max_rounds(), 3);
        // Default preserved
        assert_eq!(config.agent.temperature, 0.0);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.agent.model, "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.agent.model = "gpt-4.1".to_string();
        config.support.role_id = Some("42".to_string());

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.agent.model, "gpt-4.1");
        assert_eq!(reloaded.support.role_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["agent"].get("maxTokens").is_some());
        assert!(raw["tools"].get("maxRounds").is_some());
        assert!(raw["agent"].get("max_tokens").is_none());
    }

    #[test]
    fn test_env_override_model() {
        std::env::set_var("RATBOT_AGENT__MODEL", "test-model");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.agent.model, "test-model");
        std::env::remove_var("RATBOT_AGENT__MODEL");
    }

    #[test]
    fn test_env_override_scope() {
        std::env::set_var("RATBOT_TOOLS__SCOPE", "GMAIL, GITHUB ,");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.tools.scope, vec!["GMAIL", "GITHUB"]);
        std::env::remove_var("RATBOT_TOOLS__SCOPE");
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a,b"), vec!["a", "b"]);
        assert!(parse_list(" , ").is_empty());
    }
}
