use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Trigger Rate Monitor
#[derive(Parser)]
#[command(name = "trigger-rate-monitor")]
#[command(about = "Aggregate trigger input/class bitmasks into live-time normalised rate histograms")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Replay a CSV capture through the monitor lifecycle and write JSON-lines snapshots
    Replay(commands::replay::ReplayCommand),
    /// Show the trigger input table or the effective configuration
    Inputs(commands::inputs::InputsCommand),
}

pub fn run() -> AppResult<()> {
    // RUST_LOG controls verbosity, "error" when unset
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(command) => command.run(),
        Commands::Inputs(command) => command.run(),
    }
}
