//! listwatch CLI - announce new awesome-list entries on Telegram
//!
//! The binary is a thin shell: it loads `.env`, parses flags, initializes
//! logging, resolves configuration and hands off to a command.
use anyhow::Result;
use clap::Parser;

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

use crate::cli::{Cli, Commands};
use crate::commands::RunOptions;
use crate::utils::initialize_logging;

/// Execute the listwatch CLI with the current process environment.
///
/// # Errors
///
/// Returns an error (usually a [`error::CliError`]) if configuration, logging
/// setup or the selected command fails.
pub async fn run() -> Result<()> {
    // Variables already in the environment win over `.env`
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    initialize_logging(&cli)?;

    match &cli.command {
        Commands::Run {
            dry_run,
            skip_known,
            send_interval_ms,
            json,
        } => {
            let config = commands::resolve_config(&cli)?;
            let options = RunOptions {
                dry_run: *dry_run,
                skip_known: *skip_known,
                send_interval_ms: *send_interval_ms,
                json: *json,
            };
            commands::run_watch(config, options).await?;
        },
        Commands::Parse { lines } => commands::parse_lines(lines)?,
        Commands::Preview { line } => {
            let config = commands::resolve_config(&cli)?;
            commands::preview_line(&config, line)?;
        },
        Commands::Status { json } => {
            let config = commands::resolve_config(&cli)?;
            commands::show_status(&config, *json)?;
        },
    }

    Ok(())
}
