//! Ratbot core — shared types, conversation state, history and configuration.
//!
//! - **types**: model-facing transcript, tool-call and response types
//! - **state**: [`state::ConversationState`], stage patches and the [`state::apply`] merge
//! - **history**: bounded per-channel message history owned by the boundary layer
//! - **config**: JSON config file + env overrides

pub mod config;
pub mod history;
pub mod state;
pub mod types;
pub mod utils;

pub use state::{
    apply, ConversationState, FinalAction, Message, MessageChoice, StatePatch, SupportKind,
    SupportTicket, ToolCallRequest, ToolCallStatus,
};
