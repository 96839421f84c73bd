//! Paylens CLI - Payee analytics and duplicate detection
//!
//! Usage:
//!   paylens analyze --file history.csv [--payee NAME] [--json]
//!   paylens dedupe --file contacts.json [--json]

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze { file, payee, json } => {
            commands::cmd_analyze(&file, payee.as_deref(), json)
        }
        Commands::Dedupe { file, json } => commands::cmd_dedupe(&file, json),
    }
}
