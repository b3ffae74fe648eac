use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// One project parsed out of a list line.
///
/// Only `name` and `url` are guaranteed; everything else is best-effort and
/// absent when the line doesn't carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display name from the leading `[name]` link label.
    pub name: String,
    /// Primary link target from the leading `(url)`.
    pub url: String,
    /// Free-text summary, cut before the first parenthesis.
    pub description: String,
    /// Target of a `[Demo](...)` link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    /// Target of a `[Source Code](...)` link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// First inline-code span, conventionally the license identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Second inline-code span, conventionally the language or deployment method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
}

impl Entry {
    /// Stable identity used to recognize an entry that merely moved.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey {
            name: self.name.trim().to_lowercase(),
            url: self.url.trim().trim_end_matches('/').to_string(),
        }
    }
}

/// Case-insensitive `(name, url)` identity of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    /// Lowercased, trimmed name.
    pub name: String,
    /// Trimmed URL without trailing slash.
    pub url: String,
}

/// Metadata persisted next to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// URL the snapshot was fetched from.
    pub url: String,
    /// Base64-encoded SHA-256 of the snapshot text.
    pub sha256: String,
    /// `ETag` returned with the snapshot.
    #[serde(default)]
    pub etag: Option<String>,
    /// `Last-Modified` returned with the snapshot.
    #[serde(default)]
    pub last_modified: Option<String>,
    /// When the snapshot was last confirmed current.
    pub fetched_at: DateTime<Utc>,
    /// Number of lines in the snapshot that parse as entries.
    #[serde(default)]
    pub entries: usize,
}

/// Counters for a run that diffed against a previous snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Lines the diff reported as inserted.
    pub added_lines: usize,
    /// Inserted lines that parsed as entries.
    pub entries: usize,
    /// Notifications accepted by the delivery channel.
    pub sent: usize,
    /// Notifications the delivery channel rejected.
    pub failed: usize,
    /// Entries skipped because they already existed in the previous snapshot.
    pub skipped_known: usize,
}

/// How a single watch run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// No previous snapshot existed; the current one became the baseline.
    FirstRun {
        /// Size of the stored baseline in bytes.
        bytes: usize,
    },
    /// The remote document matched the stored snapshot.
    Unchanged,
    /// The document changed and added entries were processed.
    Checked(RunStats),
}

impl RunOutcome {
    /// Number of notifications delivered during the run.
    #[must_use]
    pub const fn sent(&self) -> usize {
        match self {
            Self::Checked(stats) => stats.sent,
            Self::FirstRun { .. } | Self::Unchanged => 0,
        }
    }
}

/// Telegram chat identifier: a numeric id or a public `@channel` username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    /// Numeric chat id (negative for groups and channels).
    Id(i64),
    /// Public username including the leading `@`.
    Username(String),
}

impl ChatId {
    /// Whether the id is usable; `0` is what an unset variable parses to.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Id(id) => *id != 0,
            Self::Username(name) => name.len() > 1 && name.starts_with('@'),
        }
    }
}

impl FromStr for ChatId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(Self::Id(id));
        }
        if trimmed.starts_with('@') && trimmed.len() > 1 {
            return Ok(Self::Username(trimmed.to_string()));
        }
        Err(Error::Config(format!(
            "Invalid chat id '{trimmed}': expected an integer or an @username"
        )))
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

/// String wrapper that never prints its contents.
///
/// Used for the bot token so that `Debug` output of the configuration is safe to
/// log.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the underlying value. Use only at the point of authentication.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether no secret was provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}
