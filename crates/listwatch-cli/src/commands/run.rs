use anyhow::Context;
use listwatch_core::{
    Config, Fetcher, FileSnapshotStore, Monitor, RunOutcome, TelegramNotifier,
};
use tracing::info;

use crate::error::CliError;

/// Flags of the `run` subcommand.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Send nothing and persist nothing
    pub dry_run: bool,
    /// Force `skip_known_entries` on
    pub skip_known: bool,
    /// Override the pause between messages
    pub send_interval_ms: Option<u64>,
    /// Print the outcome as JSON on stdout
    pub json: bool,
}

/// Execute one watch run.
///
/// Returns `Ok` when the run completed, even if some messages were rejected;
/// rejected messages show up in the logged and printed counts.
pub async fn run_watch(mut config: Config, options: RunOptions) -> Result<(), CliError> {
    if options.skip_known {
        config.run.skip_known_entries = true;
    }
    if let Some(ms) = options.send_interval_ms {
        config.run.send_interval_ms = ms;
    }

    if options.dry_run {
        config.validate_source()?;
    } else {
        config.validate()?;
    }

    let fetcher = Fetcher::with_timeout(config.run.fetch_timeout())?;
    let store = if options.dry_run {
        FileSnapshotStore::open(&config.state.dir)
    } else {
        FileSnapshotStore::new(&config.state.dir)?
    };
    let notifier =
        TelegramNotifier::new(config.telegram.api_base.as_str(), config.telegram.bot_token.clone())?;
    let monitor = Monitor::from_config(fetcher, store, notifier, &config);

    info!("Checking {}", monitor.url());

    if options.dry_run {
        let preview = monitor.preview().await?;
        info!(
            added_lines = preview.stats.added_lines,
            entries = preview.entries.len(),
            "Dry run: nothing sent, nothing saved"
        );
        if options.json {
            let json = serde_json::to_string_pretty(&preview.entries)
                .context("Failed to serialize entries")
                .map_err(CliError::internal)?;
            println!("{json}");
        } else {
            for message in &preview.messages {
                println!("{message}\n");
            }
        }
        return Ok(());
    }

    let outcome = monitor.run_once().await?;
    match &outcome {
        RunOutcome::FirstRun { bytes } => {
            info!("Stored initial snapshot ({bytes} bytes); future runs will report new entries");
        },
        RunOutcome::Unchanged => info!("Nothing new"),
        RunOutcome::Checked(stats) => info!(
            "Lines added: {}, notifications sent: {}, failed: {}",
            stats.added_lines, stats.sent, stats.failed
        ),
    }

    if options.json {
        let json = serde_json::to_string(&outcome)
            .context("Failed to serialize run outcome")
            .map_err(CliError::internal)?;
        println!("{json}");
    }
    Ok(())
}
