//! Sandbox runner for skirmish bots.
//!
//! Run with: `cargo run -p bot-sandbox -- <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CheckConfig, RunMatch};

/// Sandbox runner for skirmish bots
#[derive(Parser)]
#[command(name = "bot-sandbox")]
#[command(about = "Run and inspect skirmish bots in an in-memory world", long_about = None)]
#[command(version)]
struct Cli {
    /// Show bot decisions (`bot` target at debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play two bots against each other on the two-player map
    Run(RunMatch),

    /// Load and validate a bot configuration
    CheckConfig(CheckConfig),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    bot_sandbox::init_tracing(level);

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::CheckConfig(cmd) => cmd.execute(),
    }
}
