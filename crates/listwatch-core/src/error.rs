//! Error types and handling for listwatch-core operations.
//!
//! A single [`Error`] enum covers every failure a watch run can hit. Errors are
//! categorized so the CLI can map them onto exit codes and so log lines carry a
//! stable `category` field.
//!
//! ## Error Categories
//!
//! - **Network Errors**: Fetching the watched document
//! - **Configuration Errors**: Missing credentials or invalid settings
//! - **Storage Errors**: Snapshot persistence and the run lock
//! - **Delivery Errors**: The chat channel rejected a message
//!
//! ## Recovery Hints
//!
//! ```rust
//! use listwatch_core::Error;
//!
//! let err = Error::Timeout("fetch exceeded 30s".to_string());
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "timeout");
//! ```

use thiserror::Error;

/// The main error type for listwatch-core operations.
///
/// All fallible public functions in listwatch-core return `Result<T, Error>`.
/// The full source chain is preserved through `source()`.
#[derive(Error, Debug)]
pub enum Error {
    /// Network operation failed.
    ///
    /// Covers HTTP requests for the watched document and for the delivery channel
    /// transport. Connection and timeout failures are recoverable on the next run.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Requested resource was not found.
    ///
    /// The watched document returned 404, usually a wrong owner, repo, branch or path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or incomplete.
    ///
    /// ## Common Causes
    ///
    /// - `TELEGRAM_BOT_TOKEN` or `TELEGRAM_CHAT_ID` not set
    /// - Malformed TOML in the config file
    /// - A source URL that does not parse
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot storage failed.
    ///
    /// Covers snapshot writes, metadata corruption, and a run lock held by another
    /// process.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The delivery channel rejected a message.
    ///
    /// Raised per message; the monitor logs it and moves on to the next entry.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Operation timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away on the next scheduled run.
    ///
    /// Returns `true` for network timeouts, connection failures, explicit
    /// timeouts and rejected deliveries. Configuration and storage errors need
    /// an operator.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout(_) | Self::Delivery(_) => true,
            _ => false,
        }
    }

    /// Whether this error was caused by a request deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Get the error category as a static string identifier.
    ///
    /// Used as the `category` field in structured logs and by the CLI to pick an
    /// exit code.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::Delivery(_) => "delivery",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
