//! Tool-call executor — turns an action request into tool invocations.
//!
//! Phases:
//!
//! 1. **Parsing**: structured extraction of `{service, task, details}`.
//! 2. **Fetching tools**: discovery within the configured scope.
//! 3. **Looping**: model ↔ tool rounds, at most `max_rounds` (≤ 5).
//! 4. **Summarizing**: one extra model call when any tool ran.
//!
//! Parsing and discovery failures end the request as `failed` without
//! entering the loop. Inside the loop nothing is fatal: a failing tool call
//! or a call to a tool outside the discovered set becomes an
//! `{"error": ...}` tool turn and a model error ends the loop
//! early, so the request always finishes with a thread reply.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use ratbot_core::config::MAX_TOOL_ROUNDS;
use ratbot_core::types::{ChatMessage, OutputSchema, ToolCall, ToolDefinition};
use ratbot_core::{ConversationState, FinalAction, StatePatch, ToolCallRequest, ToolCallStatus};
use ratbot_providers::ToolProvider;

use crate::model::ModelClient;
use crate::prompts;

// ─────────────────────────────────────────────
// Outcome types
// ─────────────────────────────────────────────

/// Why the tool loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The model answered with text and no tool calls.
    Responded,
    /// The model answered with neither text nor tool calls.
    Stalled,
    /// A model call failed.
    ModelError,
    /// The round bound was hit while the model still wanted tools.
    MaxRoundsReached,
}

impl fmt::Display for LoopExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoopExit::Responded => "responded",
            LoopExit::Stalled => "stalled",
            LoopExit::ModelError => "model_error",
            LoopExit::MaxRoundsReached => "max_rounds_reached",
        };
        f.write_str(s)
    }
}

/// Reasons a request fails before the loop starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolCallFailure {
    IntentParse(String),
    Discovery(String),
    NoTools,
}

/// Everything the executor learned while serving one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCallReport {
    pub service: String,
    pub task: String,
    /// Tool executions attempted, failed ones included.
    pub tool_calls: usize,
    /// Model calls made inside the loop.
    pub rounds: u32,
    pub exit: Option<LoopExit>,
    pub failure: Option<ToolCallFailure>,
    /// User-facing text.
    pub reply: String,
}

impl ToolCallReport {
    fn failed(failure: ToolCallFailure, reply: &str) -> Self {
        ToolCallReport {
            service: String::new(),
            task: String::new(),
            tool_calls: 0,
            rounds: 0,
            exit: None,
            failure: Some(failure),
            reply: reply.to_string(),
        }
    }

    pub fn status(&self) -> ToolCallStatus {
        if self.failure.is_some() {
            ToolCallStatus::Failed
        } else if self.tool_calls > 0 {
            ToolCallStatus::Success
        } else {
            ToolCallStatus::Acknowledged
        }
    }

    /// Diagnostic one-liner. Never shown to the end user.
    pub fn action_log(&self) -> String {
        match &self.failure {
            Some(ToolCallFailure::IntentParse(reason)) => {
                format!("intent parse failed: {reason}")
            }
            Some(ToolCallFailure::Discovery(reason)) => {
                format!("service={} task={} tool discovery failed: {reason}", self.service, self.task)
            }
            Some(ToolCallFailure::NoTools) => {
                format!("service={} task={} no tools found", self.service, self.task)
            }
            None => format!(
                "service={} task={} tool_calls={} rounds={} exit={}",
                self.service,
                self.task,
                self.tool_calls,
                self.rounds,
                self.exit.map(|e| e.to_string()).unwrap_or_default()
            ),
        }
    }

    pub fn into_patch(self) -> StatePatch {
        let request = ToolCallRequest {
            action_log: self.action_log(),
            status: self.status(),
        };
        StatePatch::empty()
            .with_tool_call_request(request)
            .with_final_action(FinalAction::reply_in_thread(self.reply))
    }
}

// ─────────────────────────────────────────────
// Intent extraction
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ToolIntent {
    service: String,
    task: String,
    #[serde(default)]
    details: Option<String>,
}

fn intent_schema() -> OutputSchema {
    OutputSchema::new(
        "tool_intent",
        json!({
            "type": "object",
            "properties": {
                "service": {
                    "type": "string",
                    "description": "The external service to use, e.g. GMAIL"
                },
                "task": {
                    "type": "string",
                    "description": "The action to perform"
                },
                "details": {
                    "type": ["string", "null"],
                    "description": "Recipients, subject or other specifics, if any"
                }
            },
            "required": ["service", "task", "details"],
            "additionalProperties": false
        }),
    )
}

// ─────────────────────────────────────────────
// ToolCallExecutor
// ─────────────────────────────────────────────

/// Serves TOOL_CALL_REQUEST messages.
pub struct ToolCallExecutor {
    model: ModelClient,
    tools: Arc<dyn ToolProvider>,
    scope: Vec<String>,
    max_rounds: u32,
}

impl ToolCallExecutor {
    /// `max_rounds` is clamped to `1..=MAX_TOOL_ROUNDS`.
    pub fn new(
        model: ModelClient,
        tools: Arc<dyn ToolProvider>,
        scope: Vec<String>,
        max_rounds: u32,
    ) -> Self {
        Self {
            model,
            tools,
            scope,
            max_rounds: max_rounds.clamp(1, MAX_TOOL_ROUNDS),
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Run the executor and fold its report into a state patch.
    pub async fn handle(&self, state: &ConversationState) -> StatePatch {
        let report = self.execute(state).await;
        info!(
            status = %report.status(),
            action_log = %report.action_log(),
            "tool call request finished"
        );
        report.into_patch()
    }

    /// Run all phases for one message.
    pub async fn execute(&self, state: &ConversationState) -> ToolCallReport {
        let content = state.message.content.as_str();

        // 1. Parsing
        let intent = match self.parse_intent(content).await {
            Ok(intent) => intent,
            Err(reason) => {
                warn!(reason = %reason, "tool intent parse failed");
                return ToolCallReport::failed(
                    ToolCallFailure::IntentParse(reason),
                    prompts::TOOL_PARSE_APOLOGY,
                );
            }
        };
        debug!(
            service = %intent.service,
            task = %intent.task,
            details = ?intent.details,
            "tool intent parsed"
        );

        // 2. Fetching tools
        let tools = match self.tools.list_tools(&self.scope).await {
            Ok(tools) if tools.is_empty() => {
                warn!(scope = ?self.scope, "no tools found");
                return ToolCallReport {
                    service: intent.service,
                    task: intent.task,
                    ..ToolCallReport::failed(ToolCallFailure::NoTools, prompts::NO_TOOLS_FOUND)
                };
            }
            Ok(tools) => tools,
            Err(e) => {
                warn!(scope = ?self.scope, error = %e, "tool discovery failed");
                return ToolCallReport {
                    service: intent.service,
                    task: intent.task,
                    ..ToolCallReport::failed(
                        ToolCallFailure::Discovery(e.to_string()),
                        prompts::NO_TOOLS_FOUND,
                    )
                };
            }
        };
        if tools.len() > self.tools.max_tools() {
            warn!(
                count = tools.len(),
                limit = self.tools.max_tools(),
                provider = self.tools.display_name(),
                "tool set exceeds the provider limit"
            );
        }

        // 3. Looping
        let mut transcript = vec![
            ChatMessage::system(prompts::TOOL_LOOP_DIRECTIVE),
            ChatMessage::user(content),
        ];
        let outcome = self.run_loop(&mut transcript, &tools).await;

        // 4. Summarizing
        let reply = if outcome.tool_calls > 0 {
            self.summarize(&mut transcript, outcome.tool_calls).await
        } else {
            outcome
                .response
                .unwrap_or_else(|| prompts::NO_APPLICABLE_TOOLS.to_string())
        };

        ToolCallReport {
            service: intent.service,
            task: intent.task,
            tool_calls: outcome.tool_calls,
            rounds: outcome.rounds,
            exit: Some(outcome.exit),
            failure: None,
            reply,
        }
    }

    async fn parse_intent(&self, content: &str) -> Result<ToolIntent, String> {
        let messages = [
            ChatMessage::system(prompts::TOOL_INTENT_DIRECTIVE),
            ChatMessage::user(content),
        ];
        let intent: ToolIntent = self
            .model
            .structured(&messages, &intent_schema(), 0.0)
            .await
            .map_err(|e| e.to_string())?;

        if intent.service.trim().is_empty() || intent.task.trim().is_empty() {
            return Err("no service or task in message".to_string());
        }
        Ok(intent)
    }

    async fn run_loop(
        &self,
        transcript: &mut Vec<ChatMessage>,
        tools: &[ToolDefinition],
    ) -> LoopOutcome {
        let mut tool_calls = 0;
        let known: HashSet<&str> = tools.iter().map(|t| t.function.name.as_str()).collect();

        for round in 1..=self.max_rounds {
            debug!(round = round, "tool loop model call");

            let response = match self.model.chat(transcript, Some(tools)).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(round = round, error = %e, "tool loop model call failed");
                    return LoopOutcome::new(LoopExit::ModelError, round, tool_calls, None);
                }
            };

            let text = response.content_text();
            if !response.has_tool_calls() {
                let exit = if text.trim().is_empty() {
                    LoopExit::Stalled
                } else {
                    LoopExit::Responded
                };
                let response = (exit == LoopExit::Responded).then_some(text);
                return LoopOutcome::new(exit, round, tool_calls, response);
            }

            let calls = response.tool_calls;
            transcript.push(ChatMessage::assistant_tool_calls(
                (!text.is_empty()).then_some(text),
                calls.clone(),
            ));

            for call in &calls {
                let name = call.function.name.as_str();
                if !known.contains(name) {
                    warn!(tool = name, round = round, "model requested an undiscovered tool");
                    let result = json!({ "error": format!("unknown tool: {name}") }).to_string();
                    transcript.push(ChatMessage::tool_result(&call.id, result));
                    continue;
                }
                tool_calls += 1;
                let result = self.execute_call(call, round).await;
                transcript.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        LoopOutcome::new(LoopExit::MaxRoundsReached, self.max_rounds, tool_calls, None)
    }

    /// Execute one call. Errors become an `{"error": ...}` payload.
    async fn execute_call(&self, call: &ToolCall, round: u32) -> String {
        info!(tool = %call.function.name, round = round, "executing tool call");

        match self
            .tools
            .execute(&call.id, &call.function.name, &call.function.arguments)
            .await
        {
            Ok(value) => {
                let result = value.to_string();
                debug!(tool = %call.function.name, result_len = result.len(), "tool result");
                result
            }
            Err(e) => {
                warn!(tool = %call.function.name, error = %e, "tool call failed");
                json!({ "error": e.message }).to_string()
            }
        }
    }

    async fn summarize(&self, transcript: &mut Vec<ChatMessage>, tool_calls: usize) -> String {
        transcript.push(ChatMessage::user(prompts::TOOL_SUMMARY_REQUEST));

        match self.model.chat(transcript, None).await {
            Ok(response) => {
                let text = response.content_text();
                if text.trim().is_empty() {
                    warn!("tool summary was empty");
                    prompts::tool_summary_fallback(tool_calls)
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(error = %e, "tool summary failed");
                prompts::tool_summary_fallback(tool_calls)
            }
        }
    }
}

struct LoopOutcome {
    exit: LoopExit,
    rounds: u32,
    tool_calls: usize,
    response: Option<String>,
}

impl LoopOutcome {
    fn new(exit: LoopExit, rounds: u32, tool_calls: usize, response: Option<String>) -> Self {
        Self {
            exit,
            rounds,
            tool_calls,
            response,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
