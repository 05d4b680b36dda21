//! Collaborator clients for Ratbot.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — language-model trait (chat + structured output)
//! - [`traits::ToolProvider`] — external tool discovery + execution
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP client
//! - [`http_tools::HttpToolProvider`] — Composio-style action API client

pub mod error;
pub mod http_provider;
pub mod http_tools;
pub mod traits;

// Re-export main types for convenience
pub use error::{ProviderError, ToolExecutionError};
pub use http_provider::HttpProvider;
pub use http_tools::HttpToolProvider;
pub use traits::{LlmProvider, LlmRequestConfig, ToolProvider};
