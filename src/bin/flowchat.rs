//! Scripted chat demo over a self-looping flow.
//!
//! Feeds the given messages through a chat unit wired back to itself on the
//! continue action, using the scripted mock provider, and prints the
//! resulting transcript. Mostly useful for poking at the engine without a
//! real model back-end.
//!
//! ```bash
//! cargo run --bin flowchat -- "hello there" "what can you do?"
//! COGFLOW_REQUEST_INTERVAL=300ms cargo run --bin flowchat -- "paced hello"
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cogflow::engine::Stage;
use cogflow::llm::{ChatProvider, MockProvider, Role, Throttled};
use cogflow::nodes::{chat_loop, ChatState};
use cogflow::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "flowchat",
    about = "Run a scripted conversation through a self-looping chat flow"
)]
struct Args {
    /// User messages, consumed one per tick.
    #[arg(value_name = "MESSAGE", required = true)]
    messages: Vec<String>,

    /// System prompt for the conversation.
    #[arg(short, long, default_value = "You are a concise assistant.")]
    system: String,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::from_env()?;

    let canned = [
        "Happy to help - what are we working on?",
        "Here's my take: keep the flow small and let the actions do the routing.",
        "Done. Anything else?",
    ];
    let mock = MockProvider::new(canned).named("flowchat-demo");
    let provider: Arc<dyn ChatProvider> = match config.request_interval {
        Some(interval) => Arc::new(Throttled::new(mock, interval)),
        None => Arc::new(mock),
    };

    info!(
        provider = provider.name(),
        model = provider.default_model(),
        turns = args.messages.len(),
        "starting chat flow"
    );

    let graph = chat_loop(provider, config.max_retries);
    let mut state = ChatState::new(Some(&args.system)).with_queued(args.messages);

    let action = graph.run(&mut state).await;

    println!();
    for message in &state.transcript {
        match message.role {
            Role::System => println!("{} {}", "[system]".dimmed(), message.content.dimmed()),
            Role::User => println!("{} {}", "you:".blue().bold(), message.content),
            Role::Assistant => println!("{} {}", "bot:".green().bold(), message.content),
        }
    }
    println!();
    println!(
        "{} {} turns, final action: {}",
        "done.".bold(),
        state.turns,
        action.as_str().cyan()
    );

    Ok(())
}
