//! Command implementations for the `listwatch` CLI.

mod parse;
mod preview;
mod run;
mod status;

pub use parse::parse_lines;
pub use preview::preview_line;
pub use run::{RunOptions, run_watch};
pub use status::show_status;

use listwatch_core::Config;

use crate::cli::Cli;
use crate::error::CliError;

/// Resolve configuration from file, environment and global flags.
///
/// Nothing is validated here; each command checks what it needs.
pub fn resolve_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(dir) = &cli.state_dir {
        config.state.dir.clone_from(dir);
    }
    if let Some(mode) = cli.parse_mode {
        config.telegram.parse_mode = mode.into();
    }
    Ok(config)
}
