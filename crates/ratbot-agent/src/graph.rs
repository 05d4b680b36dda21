//! The pipeline — drives one message through the stage machine.
//!
//! Each stage reads the state and returns a [`StatePatch`]; the patch is
//! folded in with [`apply`] and [`next_stage`] picks the following stage.
//! The table is acyclic, so a run visits at most four stages.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ratbot_core::config::Config;
use ratbot_core::{apply, ConversationState, Message, MessageChoice, StatePatch};
use ratbot_providers::{LlmProvider, LlmRequestConfig, ToolProvider};

use crate::classifier::{classify_message, classify_support};
use crate::handlers;
use crate::model::ModelClient;
use crate::router::{next_stage, Stage};
use crate::tool_call::ToolCallExecutor;

/// Pipeline knobs, normally taken from [`Config`].
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    /// Model override; `None` uses the provider default.
    pub model: Option<String>,
    pub request: LlmRequestConfig,
    /// Domain support answers are restricted to.
    pub support_domain: String,
    /// Role pinged on escalated help requests.
    pub support_role: Option<String>,
    /// Offer CHAT_HISTORY_QUERY to the classifier.
    pub chat_history_query: bool,
    pub tool_scope: Vec<String>,
    pub max_tool_rounds: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        let model = (!config.agent.model.is_empty()).then(|| config.agent.model.clone());
        Self {
            model,
            request: LlmRequestConfig {
                max_tokens: config.agent.max_tokens,
                temperature: config.agent.temperature,
            },
            support_domain: config.support.domain.clone(),
            support_role: config.support.role_id.clone(),
            chat_history_query: config.features.chat_history_query,
            tool_scope: config.tools.scope.clone(),
            max_tool_rounds: config.tools.effective_max_rounds(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Classification, routing and handling for inbound messages.
///
/// Holds no per-request state; one instance serves concurrent runs.
pub struct Pipeline {
    model: ModelClient,
    tool_executor: Option<ToolCallExecutor>,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Wire the collaborators. Without a tool provider the classifier is not
    /// offered TOOL_CALL_REQUEST.
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Option<Arc<dyn ToolProvider>>,
        settings: PipelineSettings,
    ) -> Self {
        let model = ModelClient::new(llm, settings.model.clone(), settings.request.clone());
        let tool_executor = tools.map(|tools| {
            ToolCallExecutor::new(
                model.clone(),
                tools,
                settings.tool_scope.clone(),
                settings.max_tool_rounds,
            )
        });

        info!(
            model = model.model(),
            tools = tool_executor.is_some(),
            chat_history = settings.chat_history_query,
            "pipeline ready"
        );

        Self {
            model,
            tool_executor,
            settings,
        }
    }

    pub fn model(&self) -> &str {
        self.model.model()
    }

    /// Categories the classifier may choose from.
    pub fn categories(&self) -> Vec<MessageChoice> {
        let mut categories = vec![MessageChoice::Support, MessageChoice::Other];
        if self.tool_executor.is_some() {
            categories.push(MessageChoice::ToolCallRequest);
        }
        if self.settings.chat_history_query {
            categories.push(MessageChoice::ChatHistoryQuery);
        }
        categories
    }

    /// Process one message. `previous` is the channel history, oldest first.
    ///
    /// Never fails: collaborator errors surface as apology replies, or as a
    /// state without `final_action` when the message could not be classified.
    pub async fn run(&self, message: Message, previous: Vec<Message>) -> ConversationState {
        let mut state = ConversationState::new(message, previous);
        let mut stage = Stage::ClassifyMessage;

        while stage != Stage::End {
            debug!(stage = %stage, "entering stage");
            let patch = self.dispatch(stage, &state).await;
            state = apply(state, patch);
            stage = next_stage(stage, &state);
        }

        match &state.final_action {
            Some(action) => info!(choice = ?state.message_choice, action = ?action, "run finished"),
            None => warn!(author = %state.message.author, "run finished without a final action"),
        }
        state
    }

    async fn dispatch(&self, stage: Stage, state: &ConversationState) -> StatePatch {
        let domain = self.settings.support_domain.as_str();
        match stage {
            Stage::ClassifyMessage => {
                classify_message(&self.model, &self.categories(), state).await
            }
            Stage::ClassifySupport => classify_support(&self.model, state).await,
            Stage::HandleOther => handlers::handle_other(state),
            Stage::HandleSupportHelp => {
                handlers::handle_support_help(state, self.settings.support_role.as_deref())
            }
            Stage::HandleSupportQuestion => {
                handlers::handle_support_question(&self.model, domain, state).await
            }
            Stage::HandleChatHistory => {
                handlers::handle_chat_history(&self.model, domain, state).await
            }
            Stage::ExecuteToolCall => match &self.tool_executor {
                Some(executor) => executor.handle(state).await,
                None => {
                    warn!("tool call requested but no tool provider is configured");
                    StatePatch::empty()
                }
            },
            Stage::End => StatePatch::empty(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
