//! CLI error handling with semantic exit codes.
//!
//! Errors carry a category that maps to a process exit code, so a cron wrapper
//! or CI job can tell a bad configuration from a flaky network.
//!
//! # Exit Code Categories
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Run completed (delivery failures included) |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments or configuration |
//! | 5 | `Network` | Fetching the watched document failed |
//! | 6 | `Timeout` | The fetch exceeded its deadline |
//! | 7 | `Storage` | State directory, snapshot or run lock problem |
//!
//! # Usage
//!
//! ```bash
//! listwatch run
//! case $? in
//!     0) ;;
//!     5|6) echo "upstream unavailable, will retry next tick" ;;
//!     *) echo "needs attention" ;;
//! esac
//! ```

use std::fmt;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or configuration (exit code 2).
    ///
    /// Missing credentials, malformed config files and bad flag values.
    Usage = 2,

    /// Network or fetch failure (exit code 5).
    ///
    /// HTTP errors, DNS failures, and a 404 for the watched document.
    Network = 5,

    /// Operation timed out (exit code 6).
    Timeout = 6,

    /// Local state failure (exit code 7).
    ///
    /// Unreadable or unwritable snapshot, or another run holding the lock.
    Storage = 7,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::Network => "network error",
            Self::Timeout => "timeout",
            Self::Storage => "storage error",
        }
    }

    /// Map a core error onto its exit category.
    #[must_use]
    pub fn from_core(err: &listwatch_core::Error) -> Self {
        use listwatch_core::Error;

        if err.is_timeout() {
            return Self::Timeout;
        }
        match err {
            Error::Config(_) => Self::Usage,
            Error::Network(_) | Error::NotFound(_) | Error::Delivery(_) => Self::Network,
            Error::Timeout(_) => Self::Timeout,
            Error::Storage(_) | Error::Serialization(_) => Self::Storage,
            Error::Other(_) => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// Wraps an `anyhow::Error` so context added along the way is preserved.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Internal, source)
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl From<listwatch_core::Error> for CliError {
    fn from(err: listwatch_core::Error) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// Categorized errors keep their category; a bare core error is mapped by its
/// variant; anything else is internal.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<listwatch_core::Error>() {
        return ErrorCategory::from_core(core_err).exit_code();
    }
    ErrorCategory::Internal.exit_code()
}
