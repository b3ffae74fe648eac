//! # listwatch-core
//!
//! Core functionality for listwatch - a watcher that notices entries appended to a
//! curated Markdown list (an "awesome list") and announces each one to a chat.
//!
//! ## Architecture
//!
//! The crate is organized leaf-first:
//!
//! - **Parsing**: [`parse_entry`] turns one list line into an [`Entry`]
//! - **Diffing**: [`detect_additions`] finds the lines inserted between two snapshots
//! - **Formatting**: [`format_entry`] renders an entry as a chat message
//! - **Monitoring**: [`Monitor`] sequences fetch, diff, notify and persist for one run
//! - **Collaborators**: [`Fetcher`], [`FileSnapshotStore`] and [`TelegramNotifier`]
//!   implement the [`SourceFetcher`], [`SnapshotStore`] and [`Notifier`] seams
//! - **Error Handling**: a single [`Error`] type with categories and recovery hints
//!
//! ## Quick Start
//!
//! ```rust
//! use listwatch_core::{MarkupMode, detect_additions, format_entry, parse_entry};
//!
//! let previous = "# Software\n- [Foo](https://foo.example) - Does foo.";
//! let current = format!("{previous}\n- [Bar](https://bar.example) - Does bar. `MIT` `Docker`");
//!
//! for line in detect_additions(previous, &current) {
//!     if let Some(entry) = parse_entry(&line) {
//!         println!("{}", format_entry(&entry, MarkupMode::Markdown));
//!     }
//! }
//! ```

/// Configuration management
pub mod config;
/// Line-based change detection
pub mod diff;
/// Error types and handling
pub mod error;
/// HTTP client for fetching the watched document
pub mod fetcher;
/// Notification message rendering
pub mod format;
/// Run orchestration
pub mod monitor;
/// Delivery channel clients
pub mod notifier;
/// List entry parsing
pub mod parser;
/// Snapshot persistence
pub mod storage;
/// Core data types
pub mod types;

pub use config::{Config, RunConfig, SourceConfig, StateConfig, TelegramConfig};
pub use diff::detect_additions;
pub use error::{Error, Result};
pub use fetcher::{FetchResult, Fetcher, SourceFetcher};
pub use format::{MarkupMode, format_entry};
pub use monitor::{Monitor, Preview};
pub use notifier::{Notifier, OutboundMessage, TelegramNotifier};
pub use parser::{parse_entry, parse_entries};
pub use storage::{FileSnapshotStore, RunLock, SnapshotStore};
pub use types::{ChatId, Entry, EntryKey, RunOutcome, RunStats, Secret, SnapshotMeta};
