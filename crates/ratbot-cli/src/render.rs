//! Terminal rendering of final actions.
//!
//! Mirrors how a chat platform would show each action: a reply quotes the
//! prompt, a thread reply gets a thread header, an embed is drawn as a box.

use colored::Colorize;

use ratbot_core::utils::{display_timestamp, truncate_string};
use ratbot_core::FinalAction;

/// Shown when a run ends without a final action.
pub const UNPROCESSED: &str = "I'm sorry, I couldn't process your request.";

const THREAD_NAME_CHARS: usize = 50;
const EMBED_WIDTH: usize = 60;

/// Thread name derived from the prompt.
pub fn thread_name(prompt: &str) -> String {
    let head: String = prompt.chars().take(THREAD_NAME_CHARS).collect();
    format!("Action: {head}...")
}

/// Plain-text rendering of an action.
pub fn render_action(prompt: &str, action: Option<&FinalAction>, timestamp: &str) -> String {
    let quoted = format!("🗣️ \"{prompt}\"");
    match action {
        None => UNPROCESSED.to_string(),
        Some(FinalAction::Reply { content }) => format!("{quoted}\n\n{content}"),
        Some(FinalAction::ReplyInThread { content }) => {
            format!("🧵 Thread: {}\n\n{quoted}\n\n{content}", thread_name(prompt))
        }
        Some(FinalAction::CreateEmbed {
            title,
            description,
            role_to_ping,
        }) => {
            let rule = "─".repeat(EMBED_WIDTH);
            let mut out = String::new();
            if let Some(role) = role_to_ping {
                out.push_str(&format!("<@&{role}>\n"));
            }
            out.push_str(&format!("┌{rule}\n"));
            out.push_str(&format!("│ {}\n", truncate_string(title, EMBED_WIDTH)));
            out.push_str(&format!("├{rule}\n"));
            for line in description.lines() {
                out.push_str(&format!("│ {line}\n"));
            }
            out.push_str(&format!("├{rule}\n"));
            out.push_str(&format!("│ Support System • {timestamp}\n"));
            out.push_str(&format!("└{rule}"));
            out
        }
    }
}

/// Print an action to stdout.
pub fn print_action(prompt: &str, action: Option<&FinalAction>) {
    let body = render_action(prompt, action, &display_timestamp());
    println!();
    println!("{}", "🐀 Ratbot".cyan().bold());
    match action {
        None => println!("{}", body.yellow()),
        Some(FinalAction::CreateEmbed { .. }) => println!("{}", body.truecolor(255, 165, 0)),
        Some(_) => println!("{body}"),
    }
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_missing_action() {
        assert_eq!(render_action("zzz", None, "now"), UNPROCESSED);
    }

    #[test]
    fn render_reply_quotes_prompt() {
        let action = FinalAction::reply("Use the provider.");
        let out = render_action("how?", Some(&action), "now");
        assert_eq!(out, "🗣️ \"how?\"\n\nUse the provider.");
    }

    #[test]
    fn render_thread_header() {
        let prompt = "send an email to the team about the bug in the release pipeline today";
        let action = FinalAction::reply_in_thread("Done.");
        let out = render_action(prompt, Some(&action), "now");
        assert!(out.starts_with(
            "🧵 Thread: Action: send an email to the team about the bug in the rel..."
        ));
        assert!(out.ends_with("Done."));
    }

    #[test]
    fn render_embed() {
        let action = FinalAction::CreateEmbed {
            title: "Support request from alice".into(),
            description: "it broke\nbadly".into(),
            role_to_ping: Some("42".into()),
        };
        let out = render_action("it broke", Some(&action), "2024-01-01 10:00");
        assert!(out.starts_with("<@&42>\n┌"));
        assert!(out.contains("│ Support request from alice\n"));
        assert!(out.contains("│ it broke\n│ badly\n"));
        assert!(out.contains("Support System • 2024-01-01 10:00"));
    }

    #[test]
    fn thread_name_short_prompt() {
        assert_eq!(thread_name("hi"), "Action: hi...");
    }
}
