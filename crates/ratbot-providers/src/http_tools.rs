//! HTTP tool provider for Composio-style action APIs.
//!
//! - Discovery: `GET {base}/actions?apps=<scope,...>` → `{"items": [{name, description, parameters}]}`
//! - Execution: `POST {base}/actions/{name}/execute` with `{"input": {...}, "callId": "..."}`
//!   → `{"data": ..., "successful": bool, "error": string?}`
//!
//! Authentication uses the `x-api-key` header.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use ratbot_core::config::schema::ToolsConfig;
use ratbot_core::types::ToolDefinition;

use crate::error::{ProviderError, ToolExecutionError};
use crate::traits::ToolProvider;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ActionList {
    #[serde(default)]
    items: Vec<ActionDescriptor>,
}

#[derive(Debug, Deserialize)]
struct ActionDescriptor {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<Value>,
}

impl From<ActionDescriptor> for ToolDefinition {
    fn from(action: ActionDescriptor) -> Self {
        let parameters = action
            .parameters
            .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
        ToolDefinition::new(action.name, action.description.unwrap_or_default(), parameters)
    }
}

#[derive(Debug, Deserialize)]
struct ExecutionResult {
    #[serde(default)]
    data: Value,
    #[serde(default = "default_successful")]
    successful: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_successful() -> bool {
    true
}

// ─────────────────────────────────────────────
// HttpToolProvider
// ─────────────────────────────────────────────

/// Tool provider backed by a Composio-style REST API.
pub struct HttpToolProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for HttpToolProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpToolProvider")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl HttpToolProvider {
    /// Build from the `tools` config section.
    pub fn new(config: &ToolsConfig) -> Result<Self, ProviderError> {
        if !config.is_configured() {
            return Err(ProviderError::NotConfigured(
                "missing tool provider API key (set COMPOSIO_API_KEY or tools.apiKey)".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn actions_url(&self) -> String {
        format!("{}/actions", self.api_base)
    }

    /// `{base}/actions/{name}/execute`, with `name` encoded as one path segment.
    fn execute_url(&self, name: &str) -> Result<reqwest::Url, ToolExecutionError> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| ToolExecutionError::new(format!("invalid tool API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ToolExecutionError::new("tool API base cannot carry a path"))?
            .pop_if_empty()
            .push("actions")
            .push(name)
            .push("execute");
        Ok(url)
    }
}

#[async_trait]
impl ToolProvider for HttpToolProvider {
    async fn list_tools(&self, scope: &[String]) -> Result<Vec<ToolDefinition>, ProviderError> {
        let apps = scope.join(",");
        debug!(apps = %apps, "listing tools");

        let response = self
            .client
            .get(self.actions_url())
            .header("x-api-key", &self.api_key)
            .query(&[("apps", apps.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "tool discovery failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let list: ActionList = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(list.items.into_iter().map(ToolDefinition::from).collect())
    }

    async fn execute(
        &self,
        call_id: &str,
        name: &str,
        arguments: &str,
    ) -> Result<Value, ToolExecutionError> {
        let input: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments).map_err(|e| {
                ToolExecutionError::new(format!("invalid arguments for {name}: {e}"))
            })?
        };

        let url = self.execute_url(name)?;
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "input": input, "callId": call_id }))
            .send()
            .await
            .map_err(|e| ToolExecutionError::new(format!("request to {name} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(tool = name, status = %status, "tool execution rejected");
            return Err(ToolExecutionError::new(format!(
                "{name} returned {status}: {body}"
            )));
        }

        let result: ExecutionResult = response
            .json()
            .await
            .map_err(|e| ToolExecutionError::new(format!("invalid result from {name}: {e}")))?;

        if !result.successful {
            return Err(ToolExecutionError::new(
                result
                    .error
                    .unwrap_or_else(|| format!("{name} reported failure")),
            ));
        }

        Ok(result.data)
    }

    fn display_name(&self) -> &str {
        "Composio"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
