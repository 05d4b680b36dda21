//! Collaborator traits — the language model and the external tool provider.
//!
//! The pipeline only ever sees these traits; concrete clients are built by
//! the boundary layer and injected, so tests can swap in scripted fakes.

use async_trait::async_trait;
use ratbot_core::types::{ChatMessage, LlmResponse, OutputSchema, ToolDefinition};

use crate::error::{ProviderError, ToolExecutionError};

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl LlmRequestConfig {
    /// Same limits, different temperature.
    pub fn with_temperature(&self, temperature: f64) -> Self {
        Self {
            temperature,
            ..self.clone()
        }
    }
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.0,
        }
    }
}

/// Trait that all LLM providers must implement.
///
/// Implementations must be safe for concurrent use: one client serves every
/// in-flight request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Free-form or tool-augmented chat completion.
    ///
    /// # Arguments
    /// * `messages` — Transcript in OpenAI format.
    /// * `tools`    — Optional list of tool definitions the model can call.
    /// * `model`    — Model identifier (e.g. `"gpt-4o-mini"`).
    /// * `config`   — Temperature, max_tokens, etc.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// Schema-constrained completion.
    ///
    /// Returns the parsed JSON value the model produced for `schema`.
    /// Conformance beyond "is JSON" is the caller's concern.
    async fn structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<serde_json::Value, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

/// An external tool provider: discovery plus single-call execution.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// List the tools available within a capability scope.
    async fn list_tools(&self, scope: &[String]) -> Result<Vec<ToolDefinition>, ProviderError>;

    /// Execute one tool call. `arguments` is the model's raw JSON string.
    async fn execute(
        &self,
        call_id: &str,
        name: &str,
        arguments: &str,
    ) -> Result<serde_json::Value, ToolExecutionError>;

    /// Most tools a model request may carry; larger sets are only logged.
    fn max_tools(&self) -> usize {
        128
    }

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_config_with_temperature() {
        let base = LlmRequestConfig {
            max_tokens: 512,
            temperature: 0.0,
        };
        let warm = base.with_temperature(0.3);
        assert_eq!(warm.max_tokens, 512);
        assert_eq!(warm.temperature, 0.3);
    }
}
