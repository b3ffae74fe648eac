//! Configuration for a watch run.
//!
//! Configuration is resolved once at startup into an immutable [`Config`] and
//! passed explicitly to the collaborators that need it.
//!
//! ## Resolution Order
//!
//! 1. **Defaults**: watch `awesome-selfhosted/awesome-selfhosted` on `master`
//! 2. **TOML file**: optional, given with `--config` or `LISTWATCH_CONFIG`
//! 3. **Environment variables**: `GITHUB_*`, `TELEGRAM_*`, `STATE_DIR`, `LISTWATCH_*`
//! 4. **CLI flags**: applied by the binary on top of everything else
//!
//! ## Example Configuration File
//!
//! ```toml
//! [source]
//! owner = "awesome-selfhosted"
//! repo = "awesome-selfhosted"
//! branch = "master"
//!
//! [telegram]
//! chat_id = "@selfhosted_updates"
//! parse_mode = "markdown_v2"
//!
//! [state]
//! dir = "/var/lib/listwatch"
//!
//! [run]
//! send_interval_ms = 1500
//! skip_known_entries = true
//! ```
//!
//! The bot token is usually kept out of the file and supplied through
//! `TELEGRAM_BOT_TOKEN`.
//!
//! ```rust
//! use listwatch_core::Config;
//!
//! let config = Config::default();
//! assert_eq!(
//!     config.document_url(),
//!     "https://raw.githubusercontent.com/awesome-selfhosted/awesome-selfhosted/master/README.md"
//! );
//! // No credentials yet
//! assert!(config.validate().is_err());
//! ```

use crate::{ChatId, Error, MarkupMode, Result, Secret};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Host serving raw file contents for GitHub repositories.
pub const RAW_GITHUB_BASE: &str = "https://raw.githubusercontent.com";

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the watched document lives
    pub source: SourceConfig,
    /// Delivery channel settings
    pub telegram: TelegramConfig,
    /// Local state directory
    pub state: StateConfig,
    /// Run policy
    pub run: RunConfig,
}

/// Location of the watched document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Repository owner on GitHub
    pub owner: String,
    /// Repository name on GitHub
    pub repo: String,
    /// Branch to read from
    pub branch: String,
    /// Path of the document inside the repository
    pub path: String,
    /// Explicit document URL; replaces the GitHub-derived one when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            owner: "awesome-selfhosted".to_string(),
            repo: "awesome-selfhosted".to_string(),
            branch: "master".to_string(),
            path: "README.md".to_string(),
            url: None,
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token; redacted when the configuration is printed
    pub bot_token: Secret,
    /// Target chat: numeric id or `@channel`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    /// Bot API base URL
    pub api_base: String,
    /// Markup used for message bodies
    pub parse_mode: MarkupMode,
    /// Suppress link previews under each message
    pub disable_link_preview: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: Secret::default(),
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            parse_mode: MarkupMode::Markdown,
            disable_link_preview: false,
        }
    }
}

/// Local state settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Directory holding the snapshot, its metadata and the run lock
    pub dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./state"),
        }
    }
}

/// Per-run policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Pause between consecutive notifications, in milliseconds
    pub send_interval_ms: u64,
    /// Request timeout for the document fetch, in seconds
    pub fetch_timeout_secs: u64,
    /// Skip entries whose name and URL already appear in the previous snapshot
    pub skip_known_entries: bool,
    /// Send `ETag`/`Last-Modified` validators from the previous run
    pub conditional_fetch: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: 1000,
            fetch_timeout_secs: 30,
            skip_known_entries: false,
            conditional_fetch: true,
        }
    }
}

impl RunConfig {
    /// Pause between consecutive notifications.
    #[must_use]
    pub const fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    /// Request timeout for the document fetch.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    /// Load configuration from `path`, or defaults when no path is given.
    ///
    /// An explicitly named file must exist. Environment variables are not
    /// consulted here; see [`Config::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or is not valid TOML
    /// for this schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Load from `path` (if any) and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unreadable file or a malformed variable.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a variable is set but malformed.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Variables that are unset or blank leave the current value alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a variable is set but malformed.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(owner) = var("GITHUB_OWNER") {
            self.source.owner = owner;
        }
        if let Some(repo) = var("GITHUB_REPO") {
            self.source.repo = repo;
        }
        if let Some(branch) = var("GITHUB_BRANCH") {
            self.source.branch = branch;
        }
        if let Some(url) = var("LISTWATCH_SOURCE_URL") {
            self.source.url = Some(url);
        }
        if let Some(token) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Secret::new(token.trim());
        }
        if let Some(chat_id) = var("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat_id.parse()?);
        }
        if let Some(api_base) = var("TELEGRAM_API_BASE") {
            self.telegram.api_base = api_base;
        }
        if let Some(mode) = var("TELEGRAM_PARSE_MODE") {
            self.telegram.parse_mode = mode.parse()?;
        }
        if let Some(dir) = var("STATE_DIR") {
            self.state.dir = PathBuf::from(dir);
        }
        if let Some(interval) = var("LISTWATCH_SEND_INTERVAL_MS") {
            self.run.send_interval_ms = interval.trim().parse().map_err(|e| {
                Error::Config(format!(
                    "LISTWATCH_SEND_INTERVAL_MS must be a whole number of milliseconds: {e}"
                ))
            })?;
        }
        Ok(())
    }

    /// URL of the watched document.
    #[must_use]
    pub fn document_url(&self) -> String {
        if let Some(url) = &self.source.url {
            return url.clone();
        }
        format!(
            "{RAW_GITHUB_BASE}/{}/{}/{}/{}",
            self.source.owner,
            self.source.repo,
            self.source.branch,
            self.source.path.trim_start_matches('/')
        )
    }

    /// Check everything a run needs, credentials included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.validate_source()?;

        if self.telegram.bot_token.is_empty() {
            return Err(Error::Config(
                "Telegram bot token is not set (TELEGRAM_BOT_TOKEN)".to_string(),
            ));
        }
        match &self.telegram.chat_id {
            Some(chat_id) if chat_id.is_valid() => {},
            Some(_) | None => {
                return Err(Error::Config(
                    "Telegram chat id is not set (TELEGRAM_CHAT_ID)".to_string(),
                ));
            },
        }
        parse_http_url(&self.telegram.api_base, "telegram.api_base")?;
        Ok(())
    }

    /// Check the settings needed to fetch and diff, without credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first problem found.
    pub fn validate_source(&self) -> Result<()> {
        parse_http_url(&self.document_url(), "source url")?;
        if self.run.fetch_timeout_secs == 0 {
            return Err(Error::Config(
                "run.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_http_url(raw: &str, what: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Config(format!("Invalid {what} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "Invalid {what} '{raw}': unsupported scheme '{other}'"
        ))),
    }
}
