use anyhow::anyhow;
use listwatch_core::{Config, format_entry, parse_entry};

use crate::error::CliError;

/// Print the message a single list line would produce.
pub fn preview_line(config: &Config, line: &str) -> Result<(), CliError> {
    let entry = parse_entry(line).ok_or_else(|| {
        CliError::usage(anyhow!(
            "Not a list entry; expected `- [name](url) - description`"
        ))
    })?;
    println!("{}", format_entry(&entry, config.telegram.parse_mode));
    Ok(())
}
