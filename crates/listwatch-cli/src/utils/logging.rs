//! Logging initialization and configuration.
//!
//! Logs always go to stderr so stdout stays clean for `--json`, `parse` and
//! `--dry-run` output.

use anyhow::Result;
use is_terminal::IsTerminal;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, LogFormat};

/// Initialize the logging subsystem based on CLI flags.
///
/// `--verbose` selects DEBUG, `--quiet` selects ERROR, and INFO is the default so
/// that a scheduled run reports lines added and notifications sent.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = select_level(cli);
    let ansi = use_color(cli.no_color, std::env::var_os("NO_COLOR").is_some())
        && std::io::stderr().is_terminal();

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    match cli.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

fn select_level(cli: &Cli) -> Level {
    if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    }
}

const fn use_color(flag_no_color: bool, env_no_color: bool) -> bool {
    !(flag_no_color || env_no_color)
}
