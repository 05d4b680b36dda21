//! System directives and fixed user-facing texts.

use ratbot_core::MessageChoice;

/// Reply for messages outside the bot's scope.
pub const OTHER_REPLY: &str = "I'm a support bot for AI copilots, agents and LLMs. \
I can answer support questions, escalate problems to the team, look back at this \
channel's conversation, or run actions with connected tools. This message doesn't \
look like any of those, so I'll leave it here.";

/// Used when the support model call yields no usable text.
pub const NO_VALID_RESPONSE: &str = "No valid response generated by the LLM.";

/// Used when a model call fails outright in a reply-producing handler.
pub const MODEL_APOLOGY: &str =
    "Sorry, I ran into a problem while generating a response. Please try again later.";

/// Replaces the chat-history answer when the topic is out of scope.
pub const OFF_TOPIC_REFUSAL: &str =
    "I'm sorry, I'm only able to help with AI and LLMs in general with main focus on CopilotKit.";

pub const TOOL_PARSE_APOLOGY: &str = "Sorry, I couldn't understand which action you want me \
to perform. Could you rephrase it with the service and the task?";

pub const NO_TOOLS_FOUND: &str =
    "Sorry, no tools were found that could handle this request.";

pub const NO_APPLICABLE_TOOLS: &str =
    "I couldn't find any applicable tools to complete your request.";

/// Templated summary when the summary call fails.
pub fn tool_summary_fallback(tool_calls: usize) -> String {
    format!("I completed your request using {tool_calls} tool call(s).")
}

// ─────────────────────────────────────────────
// Directives
// ─────────────────────────────────────────────

fn category_line(choice: MessageChoice) -> &'static str {
    match choice {
        MessageChoice::Support => {
            "- SUPPORT: the message asks for technical support or help with a problem."
        }
        MessageChoice::Other => {
            "- OTHER: spam, general conversation or anything off topic."
        }
        MessageChoice::ToolCallRequest => {
            "- TOOL_CALL_REQUEST: the message asks you to perform an action in an external \
service, such as sending an email."
        }
        MessageChoice::ChatHistoryQuery => {
            "- CHAT_HISTORY_QUERY: the message asks about, searches or references previous \
conversations."
        }
    }
}

/// Directive for the top-level classifier, listing only the offered categories.
pub fn classifier_directive(categories: &[MessageChoice]) -> String {
    let lines: Vec<&str> = categories.iter().map(|c| category_line(*c)).collect();
    format!(
        "You are an expert message analyzer AI. Categorize the message into exactly one of \
these categories:\n\n{}\n\nBe particularly attentive to messages that mention CopilotKit, \
AI agents, LLMs, refer to previous messages, or anything about AI.",
        lines.join("\n")
    )
}

pub const SUPPORT_CLASSIFIER_DIRECTIVE: &str = "You are an expert support ticket analyzer AI. \
Categorize the support message into exactly one category:\n\n\
- QUESTION: the message asks a support question that can be answered directly.\n\
- HELP: the message asks for hands-on help from the support team.\n\
- OTHER: neither of the above.";

/// Directive for answering a support question within `domain`.
pub fn support_answer_directive(domain: &str) -> String {
    format!(
        "You are an expert support assistant. Answer the user's question only within the \
domain of {domain}. If the question falls outside that domain, say so briefly instead of \
answering."
    )
}

/// Directive for the chat-history handler, with the formatted transcript inlined.
pub fn chat_history_directive(domain: &str, transcript: &str) -> String {
    format!(
        "You are a specialized support bot that ONLY responds to queries about {domain}. \
If the query is not about these topics, indicate that it is not a relevant topic. Analyze \
the chat history to provide context-aware responses.\n\n\
Permitted topics include:\n- AI copilots\n- LLMs / AI agents / AI\n- LangChain / LangGraph\n\
- CopilotKit\n\n\
DO NOT respond to queries about other topics or personal matters.\n\n\
Here is the recent chat history for context:\n{transcript}"
    )
}

pub const TOOL_INTENT_DIRECTIVE: &str = "You extract action requests. Identify the external \
service the user wants to use (for example GMAIL), the task to perform, and any details such \
as recipients or subject. Leave service and task empty when the message does not describe an \
action.";

pub const TOOL_LOOP_DIRECTIVE: &str = "You are an assistant that completes the user's request \
by calling the available tools. Call tools as needed, one step at a time, and use each tool's \
result to decide the next step. When the request is complete, or no tool applies, reply with \
a short plain-text answer and no tool calls.";

pub const TOOL_SUMMARY_REQUEST: &str = "Summarize for the user, in one or two short sentences, \
what was accomplished above. Do not mention tool names or call ids.";
