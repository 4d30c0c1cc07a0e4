//! CLI for inspecting adsdash API error handling.

mod commands;

use adsdash_core::config;
use adsdash_core::storage::FileStore;
use adsdash_core::ErrorHandler;
use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use commands::{run_classify, run_clear, run_completions, run_simulate, run_stats};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "adsdash")]
#[command(about = "adsdash: Graph API error classification, retry and error log", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify a raw error (JSON, or plain text) and show the user message.
    Classify {
        /// Raw error value, e.g. '{"error":{"message":"...","code":190}}'.
        raw: String,
        /// Also append the error to the persisted error log.
        #[arg(long)]
        record: bool,
        /// Call-site label stored with the entry.
        #[arg(long, default_value = "cli")]
        context: String,
    },

    /// Replay a sequence of failures through the configured retry policy.
    /// The operation fails with each RAW in turn, then succeeds.
    Simulate {
        /// Raw failures for successive attempts.
        #[arg(required = true)]
        raw: Vec<String>,
        /// Call-site label stored with recorded failures.
        #[arg(long, default_value = "simulate")]
        context: String,
    },

    /// Show error log statistics.
    Stats {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Empty the error log.
    Clear,

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let handler = ErrorHandler::from_config(FileStore::open_default()?, &cfg);

        match cli.command {
            CliCommand::Classify {
                raw,
                record,
                context,
            } => run_classify(&handler, &raw, record, &context)?,
            CliCommand::Simulate { raw, context } => run_simulate(&handler, &raw, &context).await?,
            CliCommand::Stats { json } => run_stats(&handler, json)?,
            CliCommand::Clear => run_clear(&handler),
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
