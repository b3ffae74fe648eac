use std::io::{self, BufRead, Write};

use anyhow::Result;
use listwatch_core::parse_entry;
use tracing::debug;

/// Parse each line and print one JSON object per entry on stdout.
///
/// Lines that are not entries are reported on stderr. With no lines given,
/// stdin is read to the end.
pub fn parse_lines(lines: &[String]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if lines.is_empty() {
        for line in io::stdin().lock().lines() {
            emit(&mut out, &line?)?;
        }
    } else {
        for line in lines {
            emit(&mut out, line)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn emit(out: &mut impl Write, line: &str) -> Result<()> {
    match parse_entry(line) {
        Some(entry) => writeln!(out, "{}", serde_json::to_string(&entry)?)?,
        None if line.trim().is_empty() => debug!("Skipping blank line"),
        None => eprintln!("not an entry: {line}"),
    }
    Ok(())
}
