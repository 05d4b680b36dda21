//! Model handle shared by every pipeline stage.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use ratbot_core::types::{ChatMessage, LlmResponse, OutputSchema, ToolDefinition};
use ratbot_providers::{LlmProvider, LlmRequestConfig, ProviderError};

/// An [`LlmProvider`] bound to a model name and default request settings.
///
/// Cheap to clone; clones share the underlying provider.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    request: LlmRequestConfig,
}

impl ModelClient {
    /// Bind a provider. `model` defaults to the provider's own default.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: Option<String>,
        request: LlmRequestConfig,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            model,
            request,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_config(&self) -> &LlmRequestConfig {
        &self.request
    }

    /// Chat completion with the default request settings.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, ProviderError> {
        self.provider
            .chat(messages, tools, &self.model, &self.request)
            .await
    }

    /// Schema-constrained call decoded into `T`.
    ///
    /// A reply that is JSON but does not fit `T` is reported as
    /// [`ProviderError::InvalidResponse`].
    pub async fn structured<T: DeserializeOwned>(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        temperature: f64,
    ) -> Result<T, ProviderError> {
        let config = self.request.with_temperature(temperature);
        let value = self
            .provider
            .structured(messages, schema, &self.model, &config)
            .await?;
        debug!(schema = %schema.name, value = %value, "structured output");

        serde_json::from_value(value).map_err(|e| {
            warn!(schema = %schema.name, error = %e, "structured output does not match schema");
            ProviderError::InvalidResponse(format!("{} does not match schema: {e}", schema.name))
        })
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.display_name())
            .field("model", &self.model)
            .finish()
    }
}
