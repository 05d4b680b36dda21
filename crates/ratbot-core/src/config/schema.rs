//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProvidersConfig`, `ToolsConfig`,
//! `SupportConfig`, `FeaturesConfig`, `HistoryConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Hard upper bound on tool-call rounds per request.
pub const MAX_TOOL_ROUNDS: u32 = 5;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.ratbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub providers: ProvidersConfig,
    pub tools: ToolsConfig,
    pub support: SupportConfig,
    pub features: FeaturesConfig,
    pub history: HistoryConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Model settings shared by every pipeline stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature for free-form answers (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: 0.0,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Language-model provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// External tool provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// API key for the tool provider. Empty disables tool-call requests.
    pub api_key: String,
    /// Tool provider base URL.
    pub api_base: String,
    /// Capability scope requested at discovery (integration/app names).
    pub scope: Vec<String>,
    /// Rounds per request, clamped to `1..=MAX_TOOL_ROUNDS`.
    pub max_rounds: u32,
}

impl ToolsConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// `max_rounds` clamped into the supported range.
    pub fn effective_max_rounds(&self) -> u32 {
        self.max_rounds.clamp(1, MAX_TOOL_ROUNDS)
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://backend.composio.dev/api/v2".to_string(),
            scope: vec!["GMAIL".to_string()],
            max_rounds: MAX_TOOL_ROUNDS,
        }
    }
}

// ─────────────────────────────────────────────
// Support
// ─────────────────────────────────────────────

/// Support path settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportConfig {
    /// Domain the bot is allowed to answer questions about.
    pub domain: String,
    /// Role pinged on escalated help requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            domain: "AI copilots, AI agents and LLMs, with a focus on CopilotKit".to_string(),
            role_id: None,
        }
    }
}

// ─────────────────────────────────────────────
// Features / history
// ─────────────────────────────────────────────

/// Optional pipeline categories.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeaturesConfig {
    /// Offer the CHAT_HISTORY_QUERY category to the classifier.
    pub chat_history_query: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            chat_history_query: true,
        }
    }
}

/// Boundary-side history buffer settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.tools.max_rounds, 5);
        assert_eq!(config.tools.scope, vec!["GMAIL"]);
        assert!(config.features.chat_history_query);
        assert_eq!(config.history.capacity, 20);
        assert!(!config.providers.openai.is_configured());
        assert!(!config.tools.is_configured());
    }

    #[test]
    fn test_max_rounds_clamped() {
        let mut tools = ToolsConfig::default();
        tools.max_rounds = 50;
        assert_eq!(tools.effective_max_rounds(), MAX_TOOL_ROUNDS);
        tools.max_rounds = 0;
        assert_eq!(tools.effective_max_rounds(), 1);
        tools.max_rounds = 3;
        assert_eq!(tools.effective_max_rounds(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"support": {"roleId": "1234"}}"#).unwrap();
        assert_eq!(config.support.role_id.as_deref(), Some("1234"));
        assert!(config.support.domain.contains("CopilotKit"));
        assert_eq!(config.agent.max_tokens, 4096);
    }
}
