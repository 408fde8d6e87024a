//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Sui auction decoder CLI
#[derive(Parser, Debug)]
#[command(name = "sui-auction")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Auction package id (overrides config)
    #[arg(short, long, global = true, env = "AUCTION_PACKAGE_ID")]
    pub package: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify saved transaction responses
    Classify {
        /// JSON file with one response, an array, or a query page
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Derive auction state from saved object responses
    State {
        /// JSON file with one object response or an array of them
        file: PathBuf,

        /// Observation time in epoch milliseconds (defaults to now)
        #[arg(long)]
        at: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Print the classified event history of an auction
    History {
        /// Auction object id
        #[arg(short, long)]
        auction: String,

        /// Dump directory (overrides config)
        #[arg(short, long)]
        dump_dir: Option<PathBuf>,

        /// Enable caching
        #[arg(long)]
        cache: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text table
    Table,
}

impl Cli {
    /// Package id from the command line, falling back to the config
    pub fn package_id(&self, config: &Config) -> Result<String> {
        match &self.package {
            Some(package) => Ok(package.clone()),
            None => config.package_id(),
        }
    }
}

/// Execute the CLI command
pub async fn execute(args: Cli, config: Config) -> Result<()> {
    let package_id = args.package_id(&config)?;

    match args.command {
        Commands::Classify { file, output } => {
            commands::classify::execute(&file, output, &package_id, &config).await
        }
        Commands::State { file, at, output } => {
            commands::state::execute(&file, at, output, &package_id, &config).await
        }
        Commands::History {
            auction,
            dump_dir,
            cache,
            output,
        } => {
            commands::history::execute(&auction, dump_dir, cache, output, &package_id, &config)
                .await
        }
    }
}
