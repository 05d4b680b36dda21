//! Terminal handlers. Each one turns the state into a [`FinalAction`].

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use ratbot_core::state::{ChatHistoryAnswer, SupportHelp, SupportQuestion, SupportTicket};
use ratbot_core::types::{ChatMessage, OutputSchema};
use ratbot_core::utils::truncate_string;
use ratbot_core::{ConversationState, FinalAction, Message, StatePatch};

use crate::classifier::format_transcript;
use crate::model::ModelClient;
use crate::prompts;

/// Embed limits of the chat platform.
const EMBED_TITLE_LIMIT: usize = 256;
const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Chat-history answers are allowed a little creativity.
const CHAT_HISTORY_TEMPERATURE: f64 = 0.3;

/// Out-of-scope messages get a fixed explanation in a thread.
pub fn handle_other(state: &ConversationState) -> StatePatch {
    info!(author = %state.message.author, "message outside bot scope");
    StatePatch::empty().with_final_action(FinalAction::reply_in_thread(prompts::OTHER_REPLY))
}

/// Escalate to humans with an embed pinging the support role. No model call.
pub fn handle_support_help(state: &ConversationState, role_to_ping: Option<&str>) -> StatePatch {
    let message = &state.message;
    info!(author = %message.author, role = ?role_to_ping, "escalating support request");

    let action = FinalAction::CreateEmbed {
        title: truncate_string(
            &format!("Support request from {}", message.author),
            EMBED_TITLE_LIMIT,
        ),
        description: truncate_string(&message.content, EMBED_DESCRIPTION_LIMIT),
        role_to_ping: role_to_ping.map(str::to_string),
    };

    StatePatch::empty()
        .with_support_ticket(SupportTicket {
            help: Some(SupportHelp {
                description: message.content.clone(),
            }),
            ..Default::default()
        })
        .with_final_action(action)
}

/// Answer a support question with one model call scoped to `domain`.
pub async fn handle_support_question(
    model: &ModelClient,
    domain: &str,
    state: &ConversationState,
) -> StatePatch {
    let messages = [
        ChatMessage::system(prompts::support_answer_directive(domain)),
        ChatMessage::user(state.message.content.as_str()),
    ];

    let answer = match model.chat(&messages, None).await {
        Ok(response) => {
            let text = response.content_text();
            if text.trim().is_empty() {
                warn!("support answer had no text content");
                prompts::NO_VALID_RESPONSE.to_string()
            } else {
                text
            }
        }
        Err(e) => {
            warn!(error = %e, "support answer failed");
            prompts::MODEL_APOLOGY.to_string()
        }
    };

    StatePatch::empty()
        .with_support_ticket(SupportTicket {
            question: Some(SupportQuestion {
                description: state.message.content.clone(),
                answer: answer.clone(),
            }),
            ..Default::default()
        })
        .with_final_action(FinalAction::reply(answer))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQueryOutput {
    is_relevant_topic: bool,
    topic_name: String,
    response: String,
}

fn history_query_schema() -> OutputSchema {
    OutputSchema::new(
        "chat_history_query",
        json!({
            "type": "object",
            "properties": {
                "isRelevantTopic": {
                    "type": "boolean",
                    "description": "Whether the query is about a permitted topic"
                },
                "topicName": {
                    "type": "string",
                    "description": "The main topic of the query"
                },
                "response": {
                    "type": "string",
                    "description": "The response to the query based on chat history"
                }
            },
            "required": ["isRelevantTopic", "topicName", "response"],
            "additionalProperties": false
        }),
    )
}

/// Previous messages whose content contains `topic`, case-insensitively.
/// The topic is matched verbatim, so an empty topic matches every message.
pub fn messages_about(previous: &[Message], topic: &str) -> Vec<Message> {
    let topic = topic.to_lowercase();
    previous
        .iter()
        .filter(|m| m.content.to_lowercase().contains(&topic))
        .cloned()
        .collect()
}

/// Answer a question about earlier conversation in this channel.
pub async fn handle_chat_history(
    model: &ModelClient,
    domain: &str,
    state: &ConversationState,
) -> StatePatch {
    let transcript = format_transcript(&state.previous_messages);
    let messages = [
        ChatMessage::system(prompts::chat_history_directive(domain, &transcript)),
        ChatMessage::user(state.message.content.as_str()),
    ];

    let out: HistoryQueryOutput = match model
        .structured(&messages, &history_query_schema(), CHAT_HISTORY_TEMPERATURE)
        .await
    {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "chat history query failed");
            return StatePatch::empty()
                .with_final_action(FinalAction::reply(prompts::MODEL_APOLOGY));
        }
    };

    info!(
        relevant = out.is_relevant_topic,
        topic = %out.topic_name,
        "chat history query analyzed"
    );

    let response = if out.is_relevant_topic {
        out.response
    } else {
        prompts::OFF_TOPIC_REFUSAL.to_string()
    };
    let answer = ChatHistoryAnswer {
        is_relevant_topic: out.is_relevant_topic,
        relevant_messages: messages_about(&state.previous_messages, &out.topic_name),
        topic_name: out.topic_name,
        response: response.clone(),
    };

    StatePatch::empty()
        .with_chat_history(answer)
        .with_final_action(FinalAction::reply(response))
}
