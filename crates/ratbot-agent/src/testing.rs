//! Scripted collaborators for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use ratbot_core::types::{ChatMessage, LlmResponse, OutputSchema, ToolCall, ToolDefinition};
use ratbot_providers::{LlmProvider, LlmRequestConfig, ProviderError, ToolExecutionError, ToolProvider};

/// One recorded `chat` invocation.
#[derive(Clone, Debug)]
pub struct ChatCall {
    pub messages: Vec<ChatMessage>,
    pub with_tools: bool,
}

/// A language model that replays scripted responses in order.
///
/// When a queue runs dry, `chat` fails with `EmptyResponse` and `structured`
/// with `InvalidResponse`.
#[derive(Default)]
pub struct MockLlm {
    chat_responses: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
    structured_responses: Mutex<VecDeque<Result<Value, ProviderError>>>,
    chat_log: Mutex<Vec<ChatCall>>,
    structured_log: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, response: Result<LlmResponse, ProviderError>) -> Self {
        self.chat_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_structured(self, response: Result<Value, ProviderError>) -> Self {
        self.structured_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn chat_calls(&self) -> Vec<ChatCall> {
        self.chat_log.lock().unwrap().clone()
    }

    /// Number of `chat` calls made with a tool set (tool-loop rounds).
    pub fn tool_rounds(&self) -> usize {
        self.chat_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.with_tools)
            .count()
    }

    /// Schema names of all `structured` calls, in order.
    pub fn structured_schemas(&self) -> Vec<String> {
        self.structured_log
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Transcript sent with the n-th `structured` call.
    pub fn structured_messages(&self, n: usize) -> Vec<ChatMessage> {
        self.structured_log.lock().unwrap()[n].1.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.chat_log.lock().unwrap().push(ChatCall {
            messages: messages.to_vec(),
            with_tools: tools.is_some(),
        });
        self.chat_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }

    async fn structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<Value, ProviderError> {
        self.structured_log
            .lock()
            .unwrap()
            .push((schema.name.clone(), messages.to_vec()));
        self.structured_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("no scripted response".into())))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn display_name(&self) -> &str {
        "MockLlm"
    }
}

/// A tool provider with a fixed catalogue; selected tools always fail.
#[derive(Default)]
pub struct MockTools {
    tools: Vec<ToolDefinition>,
    failing: HashSet<String>,
    discovery_error: bool,
    max_tools: Option<usize>,
    list_calls: AtomicUsize,
    executed: Mutex<Vec<String>>,
}

impl MockTools {
    pub fn new(names: &[&str]) -> Self {
        Self {
            tools: names.iter().map(|n| tool(n)).collect(),
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn with_discovery_error(mut self) -> Self {
        self.discovery_error = true;
        self
    }

    /// Advertise a tool ceiling lower than the default.
    pub fn with_max_tools(mut self, limit: usize) -> Self {
        self.max_tools = Some(limit);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Names of executed tools, in execution order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Total provider calls of either kind.
    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.executed().len()
    }
}

#[async_trait]
impl ToolProvider for MockTools {
    async fn list_tools(&self, _scope: &[String]) -> Result<Vec<ToolDefinition>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.discovery_error {
            return Err(ProviderError::Api {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.tools.clone())
    }

    async fn execute(
        &self,
        call_id: &str,
        name: &str,
        _arguments: &str,
    ) -> Result<Value, ToolExecutionError> {
        self.executed.lock().unwrap().push(name.to_string());
        if self.failing.contains(name) {
            return Err(ToolExecutionError::new(format!("{name} exploded")));
        }
        Ok(json!({ "ok": true, "tool": name, "callId": call_id }))
    }

    fn max_tools(&self) -> usize {
        self.max_tools.unwrap_or(128)
    }

    fn display_name(&self) -> &str {
        "MockTools"
    }
}

/// A tool definition with an empty object schema.
pub fn tool(name: &str) -> ToolDefinition {
    ToolDefinition::new(
        name,
        format!("{name} test tool"),
        json!({"type": "object", "properties": {}}),
    )
}

/// A model response requesting the given tools, in order.
pub fn tool_call_response(names: &[&str]) -> LlmResponse {
    LlmResponse::tool_calls(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ToolCall::new(format!("call_{i}_{name}"), *name, "{}"))
            .collect(),
    )
}
