//! Model-facing types — the chat transcript, tool calls and tool definitions.
//!
//! These types model the OpenAI chat completions API format used by the
//! language-model collaborator. Transcript turns are a typed enum so a
//! malformed turn is a compile error instead of a rejected request.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Transcript turns (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A single transcript turn in the OpenAI format.
///
/// Each variant maps to a `role` field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum ChatMessage {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
    },
}

impl ChatMessage {
    /// Create a system directive turn.
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    /// Create an assistant turn with text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Create an assistant turn carrying tool calls, with optional text.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        ChatMessage::Assistant {
            content,
            tool_calls: Some(tool_calls),
        }
    }

    /// Create a tool result turn.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Tool calls (function calling)
// ─────────────────────────────────────────────

/// A tool call from the assistant, requesting execution of a function.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique ID for this tool call (used to match results).
    pub id: String,
    /// Always "function" in current OpenAI API.
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function to call.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        ToolCall {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Name of the function/tool to call.
    pub name: String,
    /// JSON-encoded arguments string.
    pub arguments: String,
}

// ─────────────────────────────────────────────
// Tool definitions (for LLM requests)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the LLM so it knows what tools are available.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Tool name as the model sees it.
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

// ─────────────────────────────────────────────
// Structured output
// ─────────────────────────────────────────────

/// A named JSON schema a structured model call must conform to.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputSchema {
    /// Schema name (`[a-zA-Z0-9_-]`, sent as `json_schema.name`).
    pub name: String,
    /// The JSON schema object.
    pub schema: serde_json::Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        OutputSchema {
            name: name.into(),
            schema,
        }
    }
}

// ─────────────────────────────────────────────
// Response content
// ─────────────────────────────────────────────

/// Assistant content as returned by a model.
///
/// Most providers return a plain string; some return an array of fragments
/// (bare strings or `{"type": "text", "text": ...}` parts).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseContent {
    Text(String),
    Fragments(Vec<ContentFragment>),
}

/// One element of an array-shaped response content.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ContentFragment {
    Plain(String),
    Part(ContentPart),
    /// Anything else (images, refusals, provider extensions). Carries no text.
    Other(serde_json::Value),
}

/// A typed content part.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
}

impl From<&str> for ResponseContent {
    fn from(s: &str) -> Self {
        ResponseContent::Text(s.to_string())
    }
}

impl From<String> for ResponseContent {
    fn from(s: String) -> Self {
        ResponseContent::Text(s)
    }
}

/// Normalize model content into a single string.
///
/// Plain text is returned as-is. Fragment arrays keep only their textual
/// fragments, joined with a single space. Returns an empty string when there is
/// no textual fragment at all.
pub fn content_text(content: Option<&ResponseContent>) -> String {
    match content {
        None => String::new(),
        Some(ResponseContent::Text(text)) => text.clone(),
        Some(ResponseContent::Fragments(fragments)) => fragments
            .iter()
            .filter_map(|fragment| match fragment {
                ContentFragment::Plain(text) => Some(text.as_str()),
                ContentFragment::Part(ContentPart::Text { text }) => Some(text.as_str()),
                ContentFragment::Other(_) => None,
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// Response from an LLM provider after a chat completion call.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Content from the assistant (None if only tool calls).
    pub content: Option<ResponseContent>,
    /// Tool calls requested by the assistant, in the order given.
    pub tool_calls: Vec<ToolCall>,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// A text-only response.
    pub fn text(content: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(ResponseContent::Text(content.into())),
            ..Default::default()
        }
    }

    /// A tool-call-only response.
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        LlmResponse {
            tool_calls,
            ..Default::default()
        }
    }

    /// Whether the response contains tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Normalized textual content (see [`content_text`]).
    pub fn content_text(&self) -> String {
        content_text(self.content.as_ref())
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Wire types (OpenAI-compatible chat completions)
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatCompletionResponse {
    /// Take the first choice, if any.
    pub fn into_response(self) -> Option<LlmResponse> {
        let usage = self.usage;
        self.choices.into_iter().next().map(|c| LlmResponse {
            content: c.message.content,
            tool_calls: c.message.tool_calls.unwrap_or_default(),
            finish_reason: c.finish_reason,
            usage,
        })
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_message_serialization() {
        let msg = ChatMessage::system("You are a support bot.");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "You are a support bot.");
    }

    #[test]
    fn test_assistant_tool_calls_serialization() {
        let tool_calls = vec![ToolCall::new(
            "call_123",
            "GMAIL_SEND_EMAIL",
            r#"{"to": "team@example.com"}"#,
        )];
        let msg = ChatMessage::assistant_tool_calls(None, tool_calls);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        assert!(json.get("content").is_none());

        let calls = json["tool_calls"].as_array().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["id"], "call_123");
        assert_eq!(calls[0]["type"], "function");
        assert_eq!(calls[0]["function"]["name"], "GMAIL_SEND_EMAIL");
    }

    #[test]
    fn test_tool_result_serialization() {
        let msg = ChatMessage::tool_result("call_123", r#"{"sent":true}"#);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_123");
    }

    #[test]
    fn test_content_text_plain() {
        let content = ResponseContent::from("hello");
        assert_eq!(content_text(Some(&content)), "hello");
    }

    #[test]
    fn test_content_text_fragments() {
        let content: ResponseContent = serde_json::from_value(json!([
            "first",
            {"type": "text", "text": "second"},
            {"type": "image_url", "image_url": {"url": "http://x"}},
            ""
        ]))
        .unwrap();
        assert_eq!(content_text(Some(&content)), "first second");
    }

    #[test]
    fn test_content_text_no_text_fragments() {
        let content: ResponseContent =
            serde_json::from_value(json!([{"type": "image_url", "image_url": {}}])).unwrap();
        assert_eq!(content_text(Some(&content)), "");
        assert_eq!(content_text(None), "");
    }

    #[test]
    fn test_chat_completion_response_parsing() {
        let api_json = json!({
            "id": "chatcmpl-abc123",
            "choices": [{
                "message": {
                    "content": "Hello! How can I help?",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 8,
                "total_tokens": 18
            }
        });

        let resp: ChatCompletionResponse = serde_json::from_value(api_json).unwrap();
        let llm_resp = resp.into_response().unwrap();

        assert_eq!(llm_resp.content_text(), "Hello! How can I help?");
        assert!(!llm_resp.has_tool_calls());
        assert_eq!(llm_resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(llm_resp.usage.as_ref().unwrap().total_tokens, 18);
    }

    #[test]
    fn test_chat_completion_with_tool_calls_parsing() {
        let api_json = json!({
            "id": "chatcmpl-xyz",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_42",
                        "type": "function",
                        "function": {
                            "name": "GMAIL_SEND_EMAIL",
                            "arguments": "{\"subject\": \"bug\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": null
        });

        let resp: ChatCompletionResponse = serde_json::from_value(api_json).unwrap();
        let llm_resp = resp.into_response().unwrap();

        assert!(llm_resp.content.is_none());
        assert_eq!(llm_resp.tool_calls.len(), 1);
        assert_eq!(llm_resp.tool_calls[0].function.name, "GMAIL_SEND_EMAIL");
    }

    #[test]
    fn test_chat_completion_empty_choices() {
        let api_json = json!({"id": "chatcmpl-empty", "choices": [], "usage": null});
        let resp: ChatCompletionResponse = serde_json::from_value(api_json).unwrap();
        assert!(resp.into_response().is_none());
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("Classify."), ChatMessage::user("Hello")],
            tools: None,
            tool_choice: None,
            response_format: Some(json!({"type": "json_schema"})),
            max_tokens: Some(1024),
            temperature: Some(0.0),
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["response_format"]["type"], "json_schema");
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
    }
}
