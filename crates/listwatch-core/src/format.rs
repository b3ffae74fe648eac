//! Notification rendering for new entries.
//!
//! Every message has the same layout: a title, the entry name and link, the
//! description, then optional demo, source, license and deployment lines in
//! that order. The [`MarkupMode`] decides how emphasis is expressed and what
//! gets escaped.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Entry, Error};

const TITLE: &str = "New Software Added";

/// Rich-text flavor understood by the delivery channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupMode {
    /// Telegram legacy `Markdown`. Text is inserted verbatim.
    ///
    /// An unpaired `_`, `*` or `` ` `` in an entry makes Telegram reject the
    /// message with 400 and the entry is not retried. Operators who need every
    /// entry delivered should set `parse_mode = "markdown_v2"`.
    #[default]
    Markdown,
    /// Telegram `MarkdownV2`. All entry text is escaped.
    MarkdownV2,
    /// Telegram `HTML`. All entry text is HTML-escaped.
    Html,
}

impl MarkupMode {
    /// Value of the Bot API `parse_mode` parameter.
    #[must_use]
    pub const fn parse_mode(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::MarkdownV2 => "MarkdownV2",
            Self::Html => "HTML",
        }
    }

    fn bold(self, text: &str) -> String {
        match self {
            Self::Markdown => format!("*{text}*"),
            Self::MarkdownV2 => format!("*{}*", escape_markdown_v2(text)),
            Self::Html => format!("<b>{}</b>", html_escape::encode_text(text)),
        }
    }

    fn code(self, text: &str) -> String {
        match self {
            Self::Markdown => format!("`{text}`"),
            Self::MarkdownV2 => format!("`{}`", escape_markdown_v2_code(text)),
            Self::Html => format!("<code>{}</code>", html_escape::encode_text(text)),
        }
    }

    fn plain(self, text: &str) -> String {
        match self {
            Self::Markdown => text.to_string(),
            Self::MarkdownV2 => escape_markdown_v2(text),
            Self::Html => html_escape::encode_text(text).into_owned(),
        }
    }
}

impl FromStr for MarkupMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "markdown" => Ok(Self::Markdown),
            "markdownv2" => Ok(Self::MarkdownV2),
            "html" => Ok(Self::Html),
            other => Err(Error::Config(format!(
                "Unknown parse mode '{other}': expected markdown, markdown_v2 or html"
            ))),
        }
    }
}

/// Render the notification body for a new entry.
///
/// # Examples
///
/// ```rust
/// use listwatch_core::{Entry, MarkupMode, format_entry};
///
/// let entry = Entry {
///     name: "Foo".into(),
///     url: "https://foo.example".into(),
///     description: "Does foo.".into(),
///     demo_url: None,
///     source_url: None,
///     license: Some("MIT".into()),
///     deployment: None,
/// };
/// let text = format_entry(&entry, MarkupMode::Markdown);
/// assert_eq!(
///     text,
///     "🆕 *New Software Added*\n\n*Foo*\n🔗 https://foo.example\n\n📝 Does foo.\n📜 License: `MIT`"
/// );
/// ```
#[must_use]
pub fn format_entry(entry: &Entry, mode: MarkupMode) -> String {
    let mut msg = format!(
        "🆕 {}\n\n{}\n🔗 {}\n\n📝 {}",
        mode.bold(TITLE),
        mode.bold(&entry.name),
        mode.plain(&entry.url),
        mode.plain(&entry.description),
    );

    if let Some(demo) = &entry.demo_url {
        let _ = write!(msg, "\n\n🎮 Demo: {}", mode.plain(demo));
    }
    if let Some(source) = &entry.source_url {
        let _ = write!(msg, "\n💻 Source: {}", mode.plain(source));
    }
    if let Some(license) = &entry.license {
        let _ = write!(msg, "\n📜 License: {}", mode.code(license));
    }
    if let Some(deployment) = &entry.deployment {
        let _ = write!(msg, "\n🚀 Deployment: {}", mode.code(deployment));
    }

    msg
}

/// Escape text outside of entities for `MarkdownV2`.
fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '_' | '*'
                | '['
                | ']'
                | '('
                | ')'
                | '~'
                | '`'
                | '>'
                | '#'
                | '+'
                | '-'
                | '='
                | '|'
                | '{'
                | '}'
                | '.'
                | '!'
                | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text inside an inline code entity for `MarkdownV2`.
fn escape_markdown_v2_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '`' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
