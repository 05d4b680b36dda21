//! Collaborator errors.

use thiserror::Error;

/// Failure talking to a language-model or tool-discovery endpoint.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("response contained no choices")]
    EmptyResponse,

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Failure of a single tool execution.
///
/// Carries only a message; the agent serializes it into the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ToolExecutionError {
    pub message: String,
}

impl ToolExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ProviderError> for ToolExecutionError {
    fn from(err: ProviderError) -> Self {
        ToolExecutionError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ProviderError::Api {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error 429: rate limited");
    }

    #[test]
    fn test_tool_error_from_provider_error() {
        let err: ToolExecutionError = ProviderError::EmptyResponse.into();
        assert_eq!(err.message, "response contained no choices");
        assert_eq!(err.to_string(), err.message);
    }
}
