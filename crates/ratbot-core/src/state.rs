//! Conversation state — the record threaded through one pipeline run.
//!
//! A run starts from [`ConversationState::new`] and every stage returns a
//! sparse [`StatePatch`]. Patches are folded in with [`apply`]; nothing else
//! mutates the state.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat-platform message: who said it and what they said.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: String,
    pub content: String,
}

impl Message {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Message {
            author: author.into(),
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────

/// Top-level category assigned by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageChoice {
    Support,
    Other,
    ToolCallRequest,
    ChatHistoryQuery,
}

impl MessageChoice {
    pub const ALL: [MessageChoice; 4] = [
        MessageChoice::Support,
        MessageChoice::Other,
        MessageChoice::ToolCallRequest,
        MessageChoice::ChatHistoryQuery,
    ];

    /// Label used in model schemas and logs.
    pub fn label(self) -> &'static str {
        match self {
            MessageChoice::Support => "SUPPORT",
            MessageChoice::Other => "OTHER",
            MessageChoice::ToolCallRequest => "TOOL_CALL_REQUEST",
            MessageChoice::ChatHistoryQuery => "CHAT_HISTORY_QUERY",
        }
    }

    /// Parse a model label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|choice| choice.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Support ticket category assigned by the support sub-classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportKind {
    Question,
    Help,
}

impl SupportKind {
    pub fn label(self) -> &'static str {
        match self {
            SupportKind::Question => "QUESTION",
            SupportKind::Help => "HELP",
        }
    }

    /// Parse a model label. `OTHER` and unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        [SupportKind::Question, SupportKind::Help]
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label.trim()))
    }
}

// ─────────────────────────────────────────────
// Stage records
// ─────────────────────────────────────────────

/// Support ticket built up across the support path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SupportKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<SupportQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<SupportHelp>,
}

/// A support question and the model's answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportQuestion {
    pub description: String,
    pub answer: String,
}

/// A help request escalated to humans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportHelp {
    pub description: String,
}

/// Outcome of a tool-call request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Success,
    Failed,
    Acknowledged,
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToolCallStatus::Success => "success",
            ToolCallStatus::Failed => "failed",
            ToolCallStatus::Acknowledged => "acknowledged",
        };
        f.write_str(s)
    }
}

/// Diagnostic record of a tool-call request. Never shown to the end user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub action_log: String,
    pub status: ToolCallStatus,
}

/// Answer to a question about earlier conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryAnswer {
    pub is_relevant_topic: bool,
    pub topic_name: String,
    pub response: String,
    pub relevant_messages: Vec<Message>,
}

/// The user-facing result of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalAction {
    Reply {
        content: String,
    },
    ReplyInThread {
        content: String,
    },
    CreateEmbed {
        title: String,
        description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        role_to_ping: Option<String>,
    },
}

impl FinalAction {
    pub fn reply(content: impl Into<String>) -> Self {
        FinalAction::Reply {
            content: content.into(),
        }
    }

    pub fn reply_in_thread(content: impl Into<String>) -> Self {
        FinalAction::ReplyInThread {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// State + patches
// ─────────────────────────────────────────────

/// Mutable record of one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub message: Message,
    /// Oldest → newest, already bounded by the caller.
    pub previous_messages: Vec<Message>,
    pub message_choice: Option<MessageChoice>,
    pub support_ticket: Option<SupportTicket>,
    pub tool_call_request: Option<ToolCallRequest>,
    pub chat_history: Option<ChatHistoryAnswer>,
    pub final_action: Option<FinalAction>,
}

impl ConversationState {
    /// Initial state for a run.
    pub fn new(message: Message, previous_messages: Vec<Message>) -> Self {
        ConversationState {
            message,
            previous_messages,
            message_choice: None,
            support_ticket: None,
            tool_call_request: None,
            chat_history: None,
            final_action: None,
        }
    }

    /// Support ticket kind, if one was classified.
    pub fn support_kind(&self) -> Option<SupportKind> {
        self.support_ticket.as_ref().and_then(|t| t.kind)
    }
}

/// Sparse update produced by a stage. `None` means "leave as is".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub message_choice: Option<MessageChoice>,
    pub support_ticket: Option<SupportTicket>,
    pub tool_call_request: Option<ToolCallRequest>,
    pub chat_history: Option<ChatHistoryAnswer>,
    pub final_action: Option<FinalAction>,
}

impl StatePatch {
    /// A patch that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_message_choice(mut self, choice: MessageChoice) -> Self {
        self.message_choice = Some(choice);
        self
    }

    pub fn with_support_ticket(mut self, ticket: SupportTicket) -> Self {
        self.support_ticket = Some(ticket);
        self
    }

    pub fn with_tool_call_request(mut self, request: ToolCallRequest) -> Self {
        self.tool_call_request = Some(request);
        self
    }

    pub fn with_chat_history(mut self, answer: ChatHistoryAnswer) -> Self {
        self.chat_history = Some(answer);
        self
    }

    pub fn with_final_action(mut self, action: FinalAction) -> Self {
        self.final_action = Some(action);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fold a patch into the state.
///
/// Merge rules:
/// - `message_choice`, `tool_call_request`, `chat_history`, `final_action`
///   are replaced when the patch carries a value.
/// - `support_ticket` is merged field by field: `kind`, `question` and `help`
///   each replace the current value only when the patch sets them.
/// - `message` and `previous_messages` are never patched.
///
/// Nothing is ever cleared.
pub fn apply(mut state: ConversationState, patch: StatePatch) -> ConversationState {
    if let Some(choice) = patch.message_choice {
        state.message_choice = Some(choice);
    }

    if let Some(update) = patch.support_ticket {
        let mut ticket = state.support_ticket.take().unwrap_or_default();
        if update.kind.is_some() {
            ticket.kind = update.kind;
        }
        if update.question.is_some() {
            ticket.question = update.question;
        }
        if update.help.is_some() {
            ticket.help = update.help;
        }
        state.support_ticket = Some(ticket);
    }

    if let Some(request) = patch.tool_call_request {
        state.tool_call_request = Some(request);
    }
    if let Some(answer) = patch.chat_history {
        state.chat_history = Some(answer);
    }
    if let Some(action) = patch.final_action {
        state.final_action = Some(action);
    }

    state
}
