//! Best-effort parser for awesome-list entry lines.
//!
//! List entries follow an informal convention:
//!
//! ```text
//! - [Name](https://project.example) - Short description. ([Demo](https://demo.example), [Source Code](https://git.example)) `MIT` `Docker`
//! ```
//!
//! Only the leading `- [name](url) - rest` shape is required. Everything after the
//! separator is mined for optional fields; anything missing is simply `None`.
//! A line that doesn't have the leading shape is not an entry, which is the
//! common case for headings, prose and blank lines.

use regex::Regex;
use std::sync::LazyLock;

use crate::Entry;

/// Leading `- [name](url) - rest` shape of a list entry.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*\[([^\]]+)\]\(([^)]+)\)\s*-\s*(.+)").unwrap());

/// `[Demo](url)` link anywhere in the remainder.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static DEMO_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Demo\]\(([^)]+)\)").unwrap());

/// `[Source Code](url)` link anywhere in the remainder.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static SOURCE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Source Code\]\(([^)]+)\)").unwrap());

/// Inline code span: `` `text` ``
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static CODE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Parse one list line into an [`Entry`].
///
/// Returns `None` for anything that isn't shaped like `- [name](url) - rest`.
///
/// # Examples
///
/// ```rust
/// use listwatch_core::parse_entry;
///
/// let entry = parse_entry(
///     "- [Foo](https://foo.example) - Does foo. ([Demo](https://demo.example)) `MIT` `Go`",
/// )
/// .unwrap();
/// assert_eq!(entry.name, "Foo");
/// assert_eq!(entry.description, "Does foo.");
/// assert_eq!(entry.demo_url.as_deref(), Some("https://demo.example"));
/// assert_eq!(entry.license.as_deref(), Some("MIT"));
/// assert_eq!(entry.deployment.as_deref(), Some("Go"));
///
/// assert!(parse_entry("## Software").is_none());
/// ```
#[must_use]
pub fn parse_entry(line: &str) -> Option<Entry> {
    let line = line.trim();
    if !line.starts_with('-') {
        return None;
    }

    let caps = ENTRY_RE.captures(line)?;
    let name = caps.get(1)?.as_str();
    let url = caps.get(2)?.as_str();
    let rest = caps.get(3)?.as_str();

    // Inline metadata (demo/source links, tags) starts at the first parenthesis.
    let description = rest.split_once('(').map_or(rest, |(head, _)| head).trim();

    let mut code_spans = CODE_SPAN_RE
        .captures_iter(rest)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()));
    let license = code_spans.next();
    let deployment = code_spans.next();

    Some(Entry {
        name: name.to_string(),
        url: url.to_string(),
        description: description.to_string(),
        demo_url: link_target(&DEMO_LINK_RE, rest),
        source_url: link_target(&SOURCE_LINK_RE, rest),
        license,
        deployment,
    })
}

/// Parse every entry line in a document, in document order.
#[must_use]
pub fn parse_entries(text: &str) -> Vec<Entry> {
    text.lines().filter_map(parse_entry).collect()
}

fn link_target(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
