//! Charla entry point.
//!
//! Binary name: `charla`.
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! starts either the terminal chat loop or the Telegram bot.

mod chat;
mod state;
mod telegram;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use state::AppState;

/// Console and Telegram chat for a locally hosted language model.
#[derive(Parser)]
#[command(name = "charla", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "charla.toml", global = true)]
    config: std::path::PathBuf,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive terminal chat.
    Chat,

    /// Start the Telegram bot.
    Bot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,charla=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init(&cli.config).await?;

    match cli.command {
        Commands::Chat => chat::loop_runner::run_chat_loop(&state).await,
        Commands::Bot => telegram::bot::run_bot(state).await,
    }
}
