//! # CLI Structure and Argument Parsing
//!
//! `listwatch` is meant to be invoked from a scheduler: one invocation is one
//! run. Subcommands cover the run itself plus a few tools for checking how
//! lines parse and render before pointing the watcher at a real chat.
//!
//! ```bash
//! # One watch run (the usual cron entry)
//! listwatch run
//!
//! # See what would be sent without sending or saving anything
//! listwatch run --dry-run
//!
//! # Inspect parsing and rendering of a single line
//! listwatch parse '- [Foo](https://foo.example) - Does foo. `MIT` `Docker`'
//! listwatch preview '- [Foo](https://foo.example) - Does foo. `MIT` `Docker`'
//!
//! # Inspect local state
//! listwatch status
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use listwatch_core::MarkupMode;
use std::path::PathBuf;

/// Main CLI structure for the `listwatch` command
#[derive(Parser, Clone, Debug)]
#[command(name = "listwatch")]
#[command(version)]
#[command(about = "listwatch - announce new awesome-list entries on Telegram", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to a TOML configuration file. Also via `LISTWATCH_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "LISTWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// State directory holding the snapshot (overrides `STATE_DIR`)
    #[arg(long = "state-dir", global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Markup for message bodies (overrides `TELEGRAM_PARSE_MODE`)
    #[arg(long = "parse-mode", global = true, value_enum)]
    pub parse_mode: Option<ParseModeArg>,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Check the list once and notify about new entries
    Run {
        /// Fetch, diff and render, but send nothing and save nothing
        #[arg(long)]
        dry_run: bool,

        /// Skip entries whose name and URL already appear in the previous snapshot
        #[arg(long)]
        skip_known: bool,

        /// Pause between messages in milliseconds (overrides `LISTWATCH_SEND_INTERVAL_MS`)
        #[arg(long, value_name = "MS")]
        send_interval_ms: Option<u64>,

        /// Print the run outcome as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Parse list lines and print the entries as JSON lines
    ///
    /// Reads lines from stdin when none are given.
    Parse {
        /// Lines to parse
        #[arg(value_name = "LINE", allow_hyphen_values = true)]
        lines: Vec<String>,
    },

    /// Print the notification a list line would produce
    Preview {
        /// List line to render
        #[arg(value_name = "LINE", allow_hyphen_values = true)]
        line: String,
    },

    /// Show the state directory, stored snapshot and metadata
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Markup mode as accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ParseModeArg {
    /// Telegram legacy Markdown
    Markdown,
    /// Telegram `MarkdownV2` with escaping
    #[value(name = "markdown-v2", alias = "markdown_v2")]
    MarkdownV2,
    /// Telegram HTML with escaping
    Html,
}

impl From<ParseModeArg> for MarkupMode {
    fn from(arg: ParseModeArg) -> Self {
        match arg {
            ParseModeArg::Markdown => Self::Markdown,
            ParseModeArg::MarkdownV2 => Self::MarkdownV2,
            ParseModeArg::Html => Self::Html,
        }
    }
}
