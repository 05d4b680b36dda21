//! Stage identifiers and the pure routing functions between them.

use std::fmt;

use ratbot_core::{ConversationState, MessageChoice, SupportKind};

/// A node of the pipeline's stage machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    ClassifyMessage,
    ClassifySupport,
    HandleOther,
    HandleSupportQuestion,
    HandleSupportHelp,
    HandleChatHistory,
    ExecuteToolCall,
    /// Terminal. Reached after a handler, or directly when unclassified.
    End,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::ClassifyMessage => "classify_message",
            Stage::ClassifySupport => "classify_support",
            Stage::HandleOther => "handle_other",
            Stage::HandleSupportQuestion => "handle_support_question",
            Stage::HandleSupportHelp => "handle_support_help",
            Stage::HandleChatHistory => "handle_chat_history",
            Stage::ExecuteToolCall => "execute_tool_call",
            Stage::End => "end",
        }
    }

    /// Whether this stage produces the final action.
    pub fn is_handler(self) -> bool {
        matches!(
            self,
            Stage::HandleOther
                | Stage::HandleSupportQuestion
                | Stage::HandleSupportHelp
                | Stage::HandleChatHistory
                | Stage::ExecuteToolCall
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level router. An absent label goes straight to [`Stage::End`].
pub fn route_message(choice: Option<MessageChoice>) -> Stage {
    match choice {
        Some(MessageChoice::Support) => Stage::ClassifySupport,
        Some(MessageChoice::Other) => Stage::HandleOther,
        Some(MessageChoice::ToolCallRequest) => Stage::ExecuteToolCall,
        Some(MessageChoice::ChatHistoryQuery) => Stage::HandleChatHistory,
        None => Stage::End,
    }
}

/// Support sub-router. An unclassified ticket is escalated to humans.
pub fn route_support(kind: Option<SupportKind>) -> Stage {
    match kind {
        Some(SupportKind::Question) => Stage::HandleSupportQuestion,
        Some(SupportKind::Help) | None => Stage::HandleSupportHelp,
    }
}

/// Transition table: the stage that follows `stage` given the state it left.
pub fn next_stage(stage: Stage, state: &ConversationState) -> Stage {
    match stage {
        Stage::ClassifyMessage => route_message(state.message_choice),
        Stage::ClassifySupport => route_support(state.support_kind()),
        Stage::HandleOther
        | Stage::HandleSupportQuestion
        | Stage::HandleSupportHelp
        | Stage::HandleChatHistory
        | Stage::ExecuteToolCall
        | Stage::End => Stage::End,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratbot_core::state::SupportTicket;
    use ratbot_core::Message;

    #[test]
    fn test_route_message_is_total() {
        assert_eq!(route_message(None), Stage::End);
        for choice in MessageChoice::ALL {
            let stage = route_message(Some(choice));
            assert_ne!(stage, Stage::End, "{choice:?} must be routed");
        }
    }

    #[test]
    fn test_route_message_table() {
        assert_eq!(route_message(Some(MessageChoice::Support)), Stage::ClassifySupport);
        assert_eq!(route_message(Some(MessageChoice::Other)), Stage::HandleOther);
        assert_eq!(
            route_message(Some(MessageChoice::ToolCallRequest)),
            Stage::ExecuteToolCall
        );
        assert_eq!(
            route_message(Some(MessageChoice::ChatHistoryQuery)),
            Stage::HandleChatHistory
        );
    }

    #[test]
    fn test_unknown_label_routes_to_end() {
        assert_eq!(route_message(MessageChoice::from_label("NONSENSE")), Stage::End);
    }

    #[test]
    fn test_route_support_default() {
        assert_eq!(route_support(Some(SupportKind::Question)), Stage::HandleSupportQuestion);
        assert_eq!(route_support(Some(SupportKind::Help)), Stage::HandleSupportHelp);
        assert_eq!(route_support(None), Stage::HandleSupportHelp);
        assert_eq!(route_support(SupportKind::from_label("OTHER")), Stage::HandleSupportHelp);
    }

    #[test]
    fn test_next_stage() {
        let mut state = ConversationState::new(Message::new("a", "b"), vec![]);
        assert_eq!(next_stage(Stage::ClassifyMessage, &state), Stage::End);

        state.message_choice = Some(MessageChoice::Support);
        assert_eq!(next_stage(Stage::ClassifyMessage, &state), Stage::ClassifySupport);
        assert_eq!(next_stage(Stage::ClassifySupport, &state), Stage::HandleSupportHelp);

        state.support_ticket = Some(SupportTicket {
            kind: Some(SupportKind::Question),
            ..Default::default()
        });
        assert_eq!(
            next_stage(Stage::ClassifySupport, &state),
            Stage::HandleSupportQuestion
        );

        for stage in [Stage::HandleOther, Stage::ExecuteToolCall, Stage::End] {
            assert!(stage == Stage::End || stage.is_handler());
            assert_eq!(next_stage(stage, &state), Stage::End);
        }
    }
}
