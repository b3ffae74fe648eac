use anyhow::Context;
use listwatch_core::storage::{META_FILE, SNAPSHOT_FILE};
use listwatch_core::{Config, FileSnapshotStore, SnapshotMeta, SnapshotStore};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct StatusReport {
    document_url: String,
    state_dir: String,
    snapshot_bytes: Option<usize>,
    meta: Option<SnapshotMeta>,
}

/// Print what the state directory currently holds.
///
/// A missing state directory is reported, not created.
pub fn show_status(config: &Config, json: bool) -> Result<(), CliError> {
    let dir = &config.state.dir;
    let store = FileSnapshotStore::open(dir);
    let snapshot_bytes = store.load_snapshot()?.map(|s| s.len());
    let meta = store.load_meta()?;

    let report = StatusReport {
        document_url: config.document_url(),
        state_dir: dir.display().to_string(),
        snapshot_bytes,
        meta,
    };

    if json {
        let out = serde_json::to_string_pretty(&report)
            .context("Failed to serialize status")
            .map_err(CliError::internal)?;
        println!("{out}");
        return Ok(());
    }

    println!("Document:  {}", report.document_url);
    println!("State dir: {}", report.state_dir);
    match report.snapshot_bytes {
        Some(bytes) => println!("Snapshot:  {SNAPSHOT_FILE} ({bytes} bytes)"),
        None => println!("Snapshot:  none (next run stores the baseline)"),
    }
    if let Some(meta) = &report.meta {
        println!("Metadata:  {META_FILE}");
        println!("  fetched: {}", meta.fetched_at.to_rfc3339());
        println!("  entries: {}", meta.entries);
        println!("  sha256:  {}", meta.sha256);
        if let Some(etag) = &meta.etag {
            println!("  etag:    {etag}");
        }
        if let Some(last_modified) = &meta.last_modified {
            println!("  last-modified: {last_modified}");
        }
        if meta.url != report.document_url {
            println!("  note: snapshot was taken from {}", meta.url);
        }
    }
    Ok(())
}
