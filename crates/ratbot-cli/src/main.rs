//! Ratbot CLI — entry point.
//!
//! # Commands
//!
//! - `ratbot ask -m MESSAGE` — run one message through the pipeline
//! - `ratbot chat` — interactive REPL with per-channel history
//! - `ratbot onboard` — write the default config
//! - `ratbot status` — show configuration and collaborator status

mod helpers;
mod onboard;
mod render;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ratbot_agent::{Pipeline, PipelineSettings};
use ratbot_core::config::{load_config, Config};
use ratbot_core::Message;
use ratbot_providers::{HttpProvider, HttpToolProvider, LlmProvider, ToolProvider};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🐀 Ratbot — support and action bot for chat communities
#[derive(Parser)]
#[command(name = "ratbot", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.ratbot/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single message
    Ask {
        /// The message text
        #[arg(short, long)]
        message: String,

        /// Author name shown to the bot
        #[arg(short, long, default_value = "you")]
        author: String,

        /// Print the final conversation state as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Interactive chat with channel history
    Chat {
        /// Author name shown to the bot
        #[arg(short, long, default_value = "you")]
        author: String,

        /// Channel whose history the messages share
        #[arg(short, long, default_value = "cli")]
        channel: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration
    Onboard,

    /// Show configuration and collaborator status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Ask {
            message,
            author,
            json,
            logs,
        } => {
            init_logging(logs);
            run_ask(config_path, Message::new(author, message), json).await
        }
        Commands::Chat {
            author,
            channel,
            logs,
        } => {
            init_logging(logs);
            let config = load_config(config_path.as_deref());
            let pipeline = build_pipeline(&config)?;
            repl::run(pipeline, &config, &author, &channel).await
        }
        Commands::Onboard => onboard::run(config_path.as_deref()),
        Commands::Status => status::run(config_path.as_deref()),
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(config_path: Option<PathBuf>, message: Message, as_json: bool) -> Result<()> {
    let config = load_config(config_path.as_deref());
    let pipeline = build_pipeline(&config)?;

    info!(author = %message.author, "processing single message");
    let prompt = message.content.clone();
    let state = pipeline.run(message, Vec::new()).await;

    if as_json {
        let json = serde_json::to_string_pretty(&state).context("failed to serialize state")?;
        println!("{json}");
    } else {
        render::print_action(&prompt, state.final_action.as_ref());
    }
    Ok(())
}

/// Build the pipeline and its HTTP collaborators from the configuration.
///
/// A missing model API key is fatal; a missing tool key only disables
/// tool-call requests.
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let settings = PipelineSettings::from_config(config);

    let llm = HttpProvider::new(&config.providers.openai, &config.agent.model)
        .context("failed to create model provider")?;
    let llm: Arc<dyn LlmProvider> = Arc::new(llm);

    let tools: Option<Arc<dyn ToolProvider>> = if config.tools.is_configured() {
        let tools = HttpToolProvider::new(&config.tools)
            .context("failed to create tool provider")?;
        let tools: Arc<dyn ToolProvider> = Arc::new(tools);
        Some(tools)
    } else {
        warn!("no tool provider API key configured, tool-call requests are disabled");
        None
    };

    Ok(Pipeline::new(llm, tools, settings))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("ratbot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_ask() {
        let cli = Cli::try_parse_from(["ratbot", "ask", "-m", "hello there", "--author", "alice"])
            .unwrap();
        let Commands::Ask { message, author, json, logs } = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(message, "hello there");
        assert_eq!(author, "alice");
        assert!(!json);
        assert!(!logs);
    }

    #[test]
    fn cli_global_config_flag() {
        let cli = Cli::try_parse_from(["ratbot", "status", "--config", "~/bot.json"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("~/bot.json"));
    }

    #[test]
    fn build_pipeline_requires_model_key() {
        let err = build_pipeline(&Config::default()).err().unwrap();
        assert!(err.to_string().contains("model provider"));
    }

    #[test]
    fn build_pipeline_without_tools() {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-test".into();
        let pipeline = build_pipeline(&config).unwrap();
        assert_eq!(pipeline.model(), "gpt-4o-mini");
        assert!(!pipeline
            .categories()
            .contains(&ratbot_core::MessageChoice::ToolCallRequest));
    }

    #[test]
    fn build_pipeline_with_tools() {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-test".into();
        config.tools.api_key = "tool-key".into();
        let pipeline = build_pipeline(&config).unwrap();
        assert!(pipeline
            .categories()
            .contains(&ratbot_core::MessageChoice::ToolCallRequest));
    }
}
