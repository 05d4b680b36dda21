//! Message classifier and support sub-classifier.
//!
//! Both are a single structured model call at temperature 0 against a closed
//! label enum. Whatever goes wrong (model error, schema mismatch, a label we
//! did not offer) the result is an empty patch: routing treats an absent
//! label as "unhandled", never as a fault.

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use ratbot_core::state::SupportTicket;
use ratbot_core::types::{ChatMessage, OutputSchema};
use ratbot_core::{ConversationState, MessageChoice, StatePatch, SupportKind};

use crate::model::ModelClient;
use crate::prompts;

/// Previous messages shown to the classifier for context.
const CLASSIFIER_HISTORY_WINDOW: usize = 5;

#[derive(Debug, Deserialize)]
struct LabelOutput {
    #[serde(rename = "type")]
    label: String,
}

fn label_schema(name: &str, labels: &[&str], description: &str) -> OutputSchema {
    OutputSchema::new(
        name,
        json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": labels,
                    "description": description,
                }
            },
            "required": ["type"],
            "additionalProperties": false,
        }),
    )
}

async fn ask_label(
    model: &ModelClient,
    schema: &OutputSchema,
    directive: String,
    content: &str,
) -> Option<String> {
    let messages = [ChatMessage::system(directive), ChatMessage::user(content)];
    match model.structured::<LabelOutput>(&messages, schema, 0.0).await {
        Ok(out) => Some(out.label),
        Err(e) => {
            warn!(schema = %schema.name, error = %e, "classification failed");
            None
        }
    }
}

/// Assign one of `categories` to the inbound message.
///
/// Recent history is appended to the directive so follow-ups like "what did
/// we say about that?" can be recognized.
pub async fn classify_message(
    model: &ModelClient,
    categories: &[MessageChoice],
    state: &ConversationState,
) -> StatePatch {
    let labels: Vec<&str> = categories.iter().map(|c| c.label()).collect();
    let schema = label_schema(
        "message_category",
        &labels,
        &format!("The category of the message, one of {}.", labels.join(", ")),
    );

    let mut directive = prompts::classifier_directive(categories);
    let recent = &state.previous_messages
        [state.previous_messages.len().saturating_sub(CLASSIFIER_HISTORY_WINDOW)..];
    if !recent.is_empty() {
        directive.push_str("\n\nRecent messages in this channel:\n");
        directive.push_str(&format_transcript(recent));
    }

    let Some(label) = ask_label(model, &schema, directive, &state.message.content).await else {
        return StatePatch::empty();
    };

    match MessageChoice::from_label(&label).filter(|c| categories.contains(c)) {
        Some(choice) => {
            info!(choice = choice.label(), "message classified");
            StatePatch::empty().with_message_choice(choice)
        }
        None => {
            warn!(label = %label, "classifier returned an unexpected label");
            StatePatch::empty()
        }
    }
}

/// Decide whether a support message is a QUESTION or a HELP request.
///
/// `OTHER` and failures leave `support_ticket.kind` unset.
pub async fn classify_support(model: &ModelClient, state: &ConversationState) -> StatePatch {
    let schema = label_schema(
        "support_category",
        &["QUESTION", "HELP", "OTHER"],
        "The type of the support ticket: QUESTION, HELP or OTHER.",
    );

    let Some(label) = ask_label(
        model,
        &schema,
        prompts::SUPPORT_CLASSIFIER_DIRECTIVE.to_string(),
        &state.message.content,
    )
    .await
    else {
        return StatePatch::empty();
    };

    match SupportKind::from_label(&label) {
        Some(kind) => {
            info!(kind = kind.label(), "support ticket classified");
            StatePatch::empty().with_support_ticket(SupportTicket {
                kind: Some(kind),
                ..Default::default()
            })
        }
        None => {
            info!(label = %label, "support ticket left unclassified");
            StatePatch::empty()
        }
    }
}

/// `author: content` lines, oldest first.
pub fn format_transcript(messages: &[ratbot_core::Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.author, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
