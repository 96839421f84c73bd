//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paylens - Payee spending analytics and duplicate detection
#[derive(Parser)]
#[command(name = "paylens")]
#[command(about = "Analyze payee transaction histories and find duplicate contacts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze per-payee transaction histories from a CSV file
    Analyze {
        /// CSV file with date,amount[,payee] rows
        #[arg(short, long)]
        file: PathBuf,

        /// Only analyze this payee
        #[arg(short, long)]
        payee: Option<String>,

        /// Emit the full reports as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Detect near-duplicate contact records from a JSON file
    Dedupe {
        /// JSON file with an array of contact records
        #[arg(short, long)]
        file: PathBuf,

        /// Emit the candidates as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
