//! One watch run: fetch, compare, notify, persist.
//!
//! [`Monitor`] owns its three collaborators and drives a single pass over the
//! watched document:
//!
//! 1. take the run lock and load the previous snapshot
//! 2. fetch the current document (conditionally, when validators are known)
//! 3. with no previous snapshot, store the current one as the baseline and stop
//! 4. otherwise diff, parse the added lines, and deliver one message per entry
//! 5. persist the current document as the new snapshot
//!
//! A failed fetch or an unreadable snapshot aborts before anything is written
//! or sent. A failed delivery is logged and counted; the remaining entries are
//! still delivered and the snapshot is still persisted, so a rejected message
//! is never sent twice.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::fetcher::{FetchResult, SourceFetcher, calculate_sha256};
use crate::notifier::{Notifier, OutboundMessage};
use crate::storage::SnapshotStore;
use crate::{
    ChatId, Config, Entry, EntryKey, Error, MarkupMode, Result, RunOutcome, RunStats,
    SnapshotMeta, detect_additions, format_entry, parse_entries, parse_entry,
};

/// Drives watch runs against a fetcher, a snapshot store and a notifier.
pub struct Monitor<F, S, N> {
    fetcher: F,
    store: S,
    notifier: N,
    url: String,
    chat_id: Option<ChatId>,
    mode: MarkupMode,
    disable_link_preview: bool,
    send_interval: Duration,
    skip_known_entries: bool,
    conditional_fetch: bool,
}

/// What the next run would send, without sending it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Counters as a real run would report them, with nothing sent
    pub stats: RunStats,
    /// Entries that would be delivered, in delivery order
    pub entries: Vec<Entry>,
    /// Rendered message bodies, parallel to `entries`
    pub messages: Vec<String>,
}

impl<F, S, N> Monitor<F, S, N>
where
    F: SourceFetcher,
    S: SnapshotStore,
    N: Notifier,
{
    /// Create a monitor for the document at `url` with default policy: legacy
    /// Markdown, one second between messages, conditional fetches on.
    pub fn new(fetcher: F, store: S, notifier: N, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            store,
            notifier,
            url: url.into(),
            chat_id: None,
            mode: MarkupMode::Markdown,
            disable_link_preview: false,
            send_interval: Duration::from_secs(1),
            skip_known_entries: false,
            conditional_fetch: true,
        }
    }

    /// Create a monitor with every setting taken from `config`.
    pub fn from_config(fetcher: F, store: S, notifier: N, config: &Config) -> Self {
        let mut monitor = Self::new(fetcher, store, notifier, config.document_url())
            .with_markup(config.telegram.parse_mode)
            .with_link_preview_disabled(config.telegram.disable_link_preview)
            .with_send_interval(config.run.send_interval())
            .skip_known_entries(config.run.skip_known_entries)
            .conditional_fetch(config.run.conditional_fetch);
        monitor.chat_id.clone_from(&config.telegram.chat_id);
        monitor
    }

    /// Destination chat for notifications.
    #[must_use]
    pub fn with_chat(mut self, chat_id: ChatId) -> Self {
        self.chat_id = Some(chat_id);
        self
    }

    /// Markup used to render messages.
    #[must_use]
    pub fn with_markup(mut self, mode: MarkupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Suppress link previews in delivered messages.
    #[must_use]
    pub fn with_link_preview_disabled(mut self, disabled: bool) -> Self {
        self.disable_link_preview = disabled;
        self
    }

    /// Pause between consecutive deliveries. Zero disables pacing.
    #[must_use]
    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Skip entries whose `(name, url)` already exists in the previous snapshot.
    #[must_use]
    pub fn skip_known_entries(mut self, enabled: bool) -> Self {
        self.skip_known_entries = enabled;
        self
    }

    /// Send validators from the previous run and short-circuit unchanged documents.
    #[must_use]
    pub fn conditional_fetch(mut self, enabled: bool) -> Self {
        self.conditional_fetch = enabled;
        self
    }

    /// URL of the watched document.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute one run.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when no chat is configured
    /// - [`Error::Storage`] when another run holds the lock or the snapshot cannot be read or written
    /// - Any fetch error ([`Error::Network`], [`Error::NotFound`], [`Error::Timeout`]); nothing is written in that case
    ///
    /// Delivery failures are not errors; they are counted in [`RunStats::failed`].
    pub async fn run_once(&self) -> Result<RunOutcome> {
        let chat_id = self
            .chat_id
            .clone()
            .ok_or_else(|| Error::Config("No chat configured for notifications".to_string()))?;

        let _guard = self.store.lock()?;

        let previous = self.load_previous()?;
        let meta = self.reusable_meta(previous.as_deref())?;

        let fetched = self.fetch(meta.as_ref()).await?;

        let (content, etag, last_modified, sha256) = match fetched {
            FetchResult::NotModified {
                etag,
                last_modified,
            } => {
                let Some(mut meta) = meta else {
                    return Err(Error::Other(format!(
                        "{} answered 304 to a request without validators",
                        self.url
                    )));
                };
                meta.fetched_at = Utc::now();
                if etag.is_some() {
                    meta.etag = etag;
                }
                if last_modified.is_some() {
                    meta.last_modified = last_modified;
                }
                self.store.save_meta(&meta)?;
                info!("No upstream changes since {}", meta.url);
                return Ok(RunOutcome::Unchanged);
            },
            FetchResult::Modified {
                content,
                etag,
                last_modified,
                sha256,
            } => (content, etag, last_modified, sha256),
        };

        let new_meta = SnapshotMeta {
            url: self.url.clone(),
            sha256,
            etag,
            last_modified,
            fetched_at: Utc::now(),
            entries: parse_entries(&content).len(),
        };

        let Some(previous) = previous else {
            self.store.save_snapshot(&content)?;
            self.store.save_meta(&new_meta)?;
            info!(
                bytes = content.len(),
                entries = new_meta.entries,
                "First run: stored baseline snapshot, no notifications sent"
            );
            return Ok(RunOutcome::FirstRun {
                bytes: content.len(),
            });
        };

        if self.conditional_fetch && calculate_sha256(&previous) == new_meta.sha256 {
            self.store.save_meta(&new_meta)?;
            info!("Document content unchanged");
            return Ok(RunOutcome::Unchanged);
        }

        let (mut stats, entries) = self.new_entries(&previous, &content);

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && !self.send_interval.is_zero() {
                tokio::time::sleep(self.send_interval).await;
            }

            let message = OutboundMessage {
                chat_id: chat_id.clone(),
                text: format_entry(entry, self.mode),
                mode: self.mode,
                disable_link_preview: self.disable_link_preview,
            };

            match self.notifier.send(&message).await {
                Ok(()) => {
                    stats.sent += 1;
                    info!(entry = %entry.name, url = %entry.url, "Sent notification");
                },
                Err(err) => {
                    stats.failed += 1;
                    error!(
                        entry = %entry.name,
                        error = %err,
                        category = err.category(),
                        "Failed to send notification"
                    );
                },
            }
        }

        self.store.save_snapshot(&content)?;
        self.store.save_meta(&new_meta)?;

        info!(
            added_lines = stats.added_lines,
            entries = stats.entries,
            sent = stats.sent,
            failed = stats.failed,
            skipped_known = stats.skipped_known,
            "Run complete"
        );
        Ok(RunOutcome::Checked(stats))
    }

    /// Fetch and diff like [`Monitor::run_once`] but send and persist nothing.
    ///
    /// The fetch is always unconditional. With no previous snapshot the preview
    /// is empty, matching what a first run would send.
    ///
    /// # Errors
    ///
    /// Fetch errors and snapshot read errors.
    pub async fn preview(&self) -> Result<Preview> {
        let previous = self.load_previous()?;
        let content = match self.fetch(None).await? {
            FetchResult::Modified { content, .. } => content,
            FetchResult::NotModified { .. } => {
                return Err(Error::Other(format!(
                    "{} answered 304 to a request without validators",
                    self.url
                )));
            },
        };

        let Some(previous) = previous else {
            info!("No previous snapshot: a run now would only store the baseline");
            return Ok(Preview {
                stats: RunStats::default(),
                entries: Vec::new(),
                messages: Vec::new(),
            });
        };

        let (stats, entries) = self.new_entries(&previous, &content);
        let messages = entries.iter().map(|e| format_entry(e, self.mode)).collect();
        Ok(Preview {
            stats,
            entries,
            messages,
        })
    }

    fn load_previous(&self) -> Result<Option<String>> {
        let previous = self.store.load_snapshot().inspect_err(|err| {
            error!(error = %err, category = err.category(), "Failed to load previous snapshot");
        })?;
        Ok(previous.filter(|s| !s.is_empty()))
    }

    /// Metadata whose validators may be sent with this run's fetch.
    fn reusable_meta(&self, previous: Option<&str>) -> Result<Option<SnapshotMeta>> {
        if !self.conditional_fetch || previous.is_none() {
            return Ok(None);
        }
        let meta = self.store.load_meta()?;
        Ok(meta.filter(|m| {
            let same_source = m.url == self.url;
            if !same_source {
                debug!("Source URL changed from {}; fetching unconditionally", m.url);
            }
            same_source
        }))
    }

    async fn fetch(&self, meta: Option<&SnapshotMeta>) -> Result<FetchResult> {
        let etag = meta.and_then(|m| m.etag.as_deref());
        let last_modified = meta.and_then(|m| m.last_modified.as_deref());

        debug!(url = %self.url, conditional = meta.is_some(), "Fetching document");
        self.fetcher
            .fetch_document(&self.url, etag, last_modified)
            .await
            .inspect_err(|err| {
                error!(
                    url = %self.url,
                    error = %err,
                    category = err.category(),
                    recoverable = err.is_recoverable(),
                    "Failed to fetch document"
                );
            })
    }

    fn new_entries(&self, previous: &str, current: &str) -> (RunStats, Vec<Entry>) {
        let added = detect_additions(previous, current);
        let mut stats = RunStats {
            added_lines: added.len(),
            ..RunStats::default()
        };

        let known: HashSet<EntryKey> = if self.skip_known_entries {
            parse_entries(previous).iter().map(Entry::key).collect()
        } else {
            HashSet::new()
        };

        let mut entries = Vec::new();
        for line in &added {
            let Some(entry) = parse_entry(line) else {
                debug!(line = %line, "Added line is not an entry");
                continue;
            };
            stats.entries += 1;
            if known.contains(&entry.key()) {
                stats.skipped_known += 1;
                debug!(entry = %entry.name, "Entry already listed, skipping");
                continue;
            }
            entries.push(entry);
        }

        if stats.added_lines > 0 && stats.entries == 0 {
            warn!(
                added_lines = stats.added_lines,
                "Document changed but no added line parsed as an entry"
            );
        }
        (stats, entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const URL: &str = "https://raw.githubusercontent.com/o/r/master/README.md";

    const BASE: &str = "# Awesome\n\n## Software\n\n- [Alpha](https://alpha.example) - First tool. `MIT` `Go`\n- [Beta](https://beta.example) - Second tool. `GPL-3.0` `Docker`";

    enum Reply {
        Content(String),
        NotModified,
        Fail,
    }

    #[derive(Clone)]
    struct FakeFetcher {
        reply: Arc<Mutex<Reply>>,
        validators: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
    }

    impl FakeFetcher {
        fn new(reply: Reply) -> Self {
            Self {
                reply: Arc::new(Mutex::new(reply)),
                validators: Arc::default(),
            }
        }

        fn serving(content: &str) -> Self {
            Self::new(Reply::Content(content.to_string()))
        }

        fn set(&self, reply: Reply) {
            *self.reply.lock().unwrap() = reply;
        }
    }

    #[async_trait]
    impl SourceFetcher for FakeFetcher {
        async fn fetch_document(
            &self,
            _url: &str,
            etag: Option<&str>,
            last_modified: Option<&str>,
        ) -> Result<FetchResult> {
            self.validators
                .lock()
                .unwrap()
                .push((etag.map(String::from), last_modified.map(String::from)));
            match &*self.reply.lock().unwrap() {
                Reply::Content(content) => Ok(FetchResult::Modified {
                    content: content.clone(),
                    etag: Some("\"etag-1\"".to_string()),
                    last_modified: None,
                    sha256: calculate_sha256(content),
                }),
                Reply::NotModified => Ok(FetchResult::NotModified {
                    etag: None,
                    last_modified: None,
                }),
                Reply::Fail => Err(Error::Timeout("fetch exceeded deadline".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct MemoryState {
        snapshot: Option<String>,
        meta: Option<SnapshotMeta>,
        locked: bool,
        snapshot_writes: usize,
        fail_reads: bool,
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        state: Arc<Mutex<MemoryState>>,
    }

    impl MemoryStore {
        fn with_snapshot(content: &str) -> Self {
            let store = Self::default();
            store.state.lock().unwrap().snapshot = Some(content.to_string());
            store
        }

        fn snapshot(&self) -> Option<String> {
            self.state.lock().unwrap().snapshot.clone()
        }

        fn meta(&self) -> Option<SnapshotMeta> {
            self.state.lock().unwrap().meta.clone()
        }

        fn snapshot_writes(&self) -> usize {
            self.state.lock().unwrap().snapshot_writes
        }
    }

    struct MemoryGuard(Arc<Mutex<MemoryState>>);

    impl Drop for MemoryGuard {
        fn drop(&mut self) {
            self.0.lock().unwrap().locked = false;
        }
    }

    impl SnapshotStore for MemoryStore {
        type Guard = MemoryGuard;

        fn lock(&self) -> Result<MemoryGuard> {
            let mut state = self.state.lock().unwrap();
            if state.locked {
                return Err(Error::Storage("Another run is in progress".to_string()));
            }
            state.locked = true;
            Ok(MemoryGuard(Arc::clone(&self.state)))
        }

        fn load_snapshot(&self) -> Result<Option<String>> {
            let state = self.state.lock().unwrap();
            if state.fail_reads {
                return Err(Error::Storage("disk on fire".to_string()));
            }
            Ok(state.snapshot.clone())
        }

        fn save_snapshot(&self, content: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.snapshot = Some(content.to_string());
            state.snapshot_writes += 1;
            Ok(())
        }

        fn load_meta(&self) -> Result<Option<SnapshotMeta>> {
            Ok(self.state.lock().unwrap().meta.clone())
        }

        fn save_meta(&self, meta: &SnapshotMeta) -> Result<()> {
            self.state.lock().unwrap().meta = Some(meta.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<OutboundMessage>>>,
        attempts: Arc<Mutex<usize>>,
        fail_attempts: Vec<usize>,
    }

    impl RecordingNotifier {
        fn failing_on(attempts: &[usize]) -> Self {
            Self {
                fail_attempts: attempts.to_vec(),
                ..Self::default()
            }
        }

        fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.text.clone())
                .collect()
        }

        fn attempts(&self) -> usize {
            *self.attempts.lock().unwrap()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &OutboundMessage) -> Result<()> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts
            };
            if self.fail_attempts.contains(&attempt) {
                return Err(Error::Delivery("Bad Request: chat not found".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn monitor(
        fetcher: &FakeFetcher,
        store: &MemoryStore,
        notifier: &RecordingNotifier,
    ) -> Monitor<FakeFetcher, MemoryStore, RecordingNotifier> {
        Monitor::new(fetcher.clone(), store.clone(), notifier.clone(), URL)
            .with_chat(ChatId::Id(-100))
            .with_send_interval(Duration::ZERO)
    }

    fn with_lines(base: &str, lines: &[&str]) -> String {
        let mut doc = base.to_string();
        for line in lines {
            doc.push('\n');
            doc.push_str(line);
        }
        doc
    }

    #[tokio::test]
    async fn first_run_stores_baseline_without_notifying() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let outcome = monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        assert_eq!(outcome, RunOutcome::FirstRun { bytes: BASE.len() });
        assert_eq!(store.snapshot().as_deref(), Some(BASE));
        assert_eq!(notifier.attempts(), 0);

        let meta = store.meta().expect("meta written");
        assert_eq!(meta.url, URL);
        assert_eq!(meta.entries, 2);
        assert_eq!(meta.etag.as_deref(), Some("\"etag-1\""));
    }

    #[tokio::test]
    async fn empty_previous_snapshot_counts_as_first_run() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::with_snapshot("");
        let notifier = RecordingNotifier::default();

        let outcome = monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        assert!(matches!(outcome, RunOutcome::FirstRun { .. }));
        assert_eq!(notifier.attempts(), 0);
        assert_eq!(store.snapshot().as_deref(), Some(BASE));
    }

    #[tokio::test]
    async fn appended_entries_are_notified_in_order() {
        let current = with_lines(
            BASE,
            &[
                "- [Gamma](https://gamma.example) - Third tool. ([Demo](https://demo.gamma.example)) `MIT` `PHP`",
                "",
                "## Another Section",
                "- [Delta](https://delta.example) - Fourth tool.",
            ],
        );
        let fetcher = FakeFetcher::serving(&current);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        let outcome = monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Checked(RunStats {
                added_lines: 4,
                entries: 2,
                sent: 2,
                failed: 0,
                skipped_known: 0,
            })
        );
        let texts = notifier.texts();
        assert!(texts[0].contains("*Gamma*"));
        assert!(texts[0].contains("🎮 Demo: https://demo.gamma.example"));
        assert!(texts[1].contains("*Delta*"));
        assert_eq!(store.snapshot().as_deref(), Some(current.as_str()));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].chat_id, ChatId::Id(-100));
        assert_eq!(sent[0].mode, MarkupMode::Markdown);
    }

    #[tokio::test]
    async fn second_run_without_changes_sends_nothing() {
        let current = with_lines(BASE, &["- [Gamma](https://gamma.example) - Third tool."]);
        let fetcher = FakeFetcher::serving(&current);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();
        let monitor = monitor(&fetcher, &store, &notifier).conditional_fetch(false);

        let first = monitor.run_once().await.unwrap();
        assert_eq!(first.sent(), 1);

        let second = monitor.run_once().await.unwrap();
        assert_eq!(second, RunOutcome::Checked(RunStats::default()));
        assert_eq!(notifier.attempts(), 1);
        assert_eq!(store.snapshot().as_deref(), Some(current.as_str()));
    }

    #[tokio::test]
    async fn delivery_failure_does_not_block_later_entries() {
        let current = with_lines(
            BASE,
            &[
                "- [One](https://one.example) - One.",
                "- [Two](https://two.example) - Two.",
                "- [Three](https://three.example) - Three.",
            ],
        );
        let fetcher = FakeFetcher::serving(&current);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::failing_on(&[2]);

        let outcome = monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        let RunOutcome::Checked(stats) = outcome else {
            panic!("expected a checked run, got {outcome:?}");
        };
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(notifier.attempts(), 3);

        let texts = notifier.texts();
        assert!(texts[0].contains("*One*"));
        assert!(texts[1].contains("*Three*"));

        assert_eq!(store.snapshot().as_deref(), Some(current.as_str()));
    }

    #[tokio::test]
    async fn fetch_failure_leaves_state_untouched() {
        let fetcher = FakeFetcher::new(Reply::Fail);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        let err = monitor(&fetcher, &store, &notifier).run_once().await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(store.snapshot().as_deref(), Some(BASE));
        assert_eq!(store.snapshot_writes(), 0);
        assert!(store.meta().is_none());
        assert_eq!(notifier.attempts(), 0);
    }

    #[tokio::test]
    async fn unreadable_snapshot_aborts_before_fetch() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::with_snapshot(BASE);
        store.state.lock().unwrap().fail_reads = true;
        let notifier = RecordingNotifier::default();

        let err = monitor(&fetcher, &store, &notifier).run_once().await.unwrap_err();

        assert_eq!(err.category(), "storage");
        assert!(fetcher.validators.lock().unwrap().is_empty());
        assert_eq!(store.snapshot_writes(), 0);
    }

    #[tokio::test]
    async fn missing_chat_is_a_config_error() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let monitor = Monitor::new(fetcher.clone(), store.clone(), notifier, URL);

        let err = monitor.run_once().await.unwrap_err();

        assert_eq!(err.category(), "config");
        assert!(fetcher.validators.lock().unwrap().is_empty());
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn held_lock_blocks_the_run() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        let _held = store.lock().unwrap();
        let err = monitor(&fetcher, &store, &notifier).run_once().await.unwrap_err();

        assert!(matches!(err, Error::Storage(msg) if msg.contains("in progress")));
        assert!(fetcher.validators.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn conditional_fetch_sends_validators_and_handles_304() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let monitor = monitor(&fetcher, &store, &notifier);

        monitor.run_once().await.unwrap();
        let first_fetch = store.meta().unwrap().fetched_at;

        fetcher.set(Reply::NotModified);
        let outcome = monitor.run_once().await.unwrap();

        assert_eq!(outcome, RunOutcome::Unchanged);
        assert_eq!(store.snapshot_writes(), 1);
        assert!(store.meta().unwrap().fetched_at >= first_fetch);
        assert_eq!(store.meta().unwrap().etag.as_deref(), Some("\"etag-1\""));

        let validators = fetcher.validators.lock().unwrap();
        assert_eq!(validators[0], (None, None));
        assert_eq!(validators[1], (Some("\"etag-1\"".to_string()), None));
    }

    #[tokio::test]
    async fn identical_content_is_unchanged_without_rewrite() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        let outcome = monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        assert_eq!(outcome, RunOutcome::Unchanged);
        assert_eq!(store.snapshot_writes(), 0);
        assert!(store.meta().is_some());
    }

    #[tokio::test]
    async fn validators_from_another_source_are_not_sent() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::with_snapshot(BASE);
        store.state.lock().unwrap().meta = Some(SnapshotMeta {
            url: "https://elsewhere.example/README.md".to_string(),
            sha256: String::new(),
            etag: Some("\"old\"".to_string()),
            last_modified: None,
            fetched_at: Utc::now(),
            entries: 0,
        });
        let notifier = RecordingNotifier::default();

        monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        assert_eq!(fetcher.validators.lock().unwrap()[0], (None, None));
    }

    #[tokio::test]
    async fn moved_entries_are_skipped_when_enabled() {
        let previous = "- [Alpha](https://alpha.example) - First.\n- [Beta](https://beta.example) - Second.\n- [Gamma](https://gamma.example) - Third.";
        let current = "- [Beta](https://beta.example) - Second.\n- [Gamma](https://gamma.example) - Third.\n- [Alpha](https://alpha.example/) - First, moved.\n- [New](https://new.example) - Brand new.";
        let fetcher = FakeFetcher::serving(current);
        let store = MemoryStore::with_snapshot(previous);
        let notifier = RecordingNotifier::default();

        let outcome = monitor(&fetcher, &store, &notifier)
            .skip_known_entries(true)
            .run_once()
            .await
            .unwrap();

        let RunOutcome::Checked(stats) = outcome else {
            panic!("expected a checked run, got {outcome:?}");
        };
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.skipped_known, 1);
        assert_eq!(stats.sent, 1);
        assert!(notifier.texts()[0].contains("*New*"));
    }

    #[tokio::test]
    async fn moved_entries_are_notified_by_default() {
        let previous = "- [Alpha](https://alpha.example) - First.\n- [Beta](https://beta.example) - Second.";
        let current = "- [Beta](https://beta.example) - Second.\n- [Alpha](https://alpha.example) - First.";
        let fetcher = FakeFetcher::serving(current);
        let store = MemoryStore::with_snapshot(previous);
        let notifier = RecordingNotifier::default();

        let outcome = monitor(&fetcher, &store, &notifier).run_once().await.unwrap();

        assert_eq!(outcome.sent(), 1);
    }

    #[tokio::test]
    async fn markup_mode_and_preview_flag_reach_the_notifier() {
        let current = with_lines(BASE, &["- [my_app](https://my-app.example) - Tool."]);
        let fetcher = FakeFetcher::serving(&current);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        monitor(&fetcher, &store, &notifier)
            .with_markup(MarkupMode::MarkdownV2)
            .with_link_preview_disabled(true)
            .run_once()
            .await
            .unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].mode, MarkupMode::MarkdownV2);
        assert!(sent[0].disable_link_preview);
        assert!(sent[0].text.contains("*my\\_app*"));
    }

    #[tokio::test]
    async fn deliveries_are_spaced_by_the_send_interval() {
        let current = with_lines(
            BASE,
            &[
                "- [One](https://one.example) - One.",
                "- [Two](https://two.example) - Two.",
                "- [Three](https://three.example) - Three.",
            ],
        );
        let fetcher = FakeFetcher::serving(&current);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        let started = std::time::Instant::now();
        monitor(&fetcher, &store, &notifier)
            .with_send_interval(Duration::from_millis(25))
            .run_once()
            .await
            .unwrap();

        // Two gaps for three messages
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(notifier.attempts(), 3);
    }

    #[tokio::test]
    async fn preview_renders_without_side_effects() {
        let current = with_lines(BASE, &["- [Gamma](https://gamma.example) - Third tool."]);
        let fetcher = FakeFetcher::serving(&current);
        let store = MemoryStore::with_snapshot(BASE);
        let notifier = RecordingNotifier::default();

        let preview = monitor(&fetcher, &store, &notifier).preview().await.unwrap();

        assert_eq!(preview.entries.len(), 1);
        assert_eq!(preview.entries[0].name, "Gamma");
        assert!(preview.messages[0].starts_with("🆕 *New Software Added*"));
        assert_eq!(preview.stats.sent, 0);
        assert_eq!(notifier.attempts(), 0);
        assert_eq!(store.snapshot_writes(), 0);
        assert!(store.meta().is_none());
    }

    #[tokio::test]
    async fn preview_on_first_run_is_empty() {
        let fetcher = FakeFetcher::serving(BASE);
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let preview = monitor(&fetcher, &store, &notifier).preview().await.unwrap();

        assert!(preview.messages.is_empty());
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn from_config_applies_settings() {
        let mut config = Config::default();
        config.telegram.chat_id = Some(ChatId::Username("@c".into()));
        config.telegram.parse_mode = MarkupMode::Html;
        config.run.send_interval_ms = 0;

        let monitor = Monitor::from_config(
            FakeFetcher::serving(BASE),
            MemoryStore::default(),
            RecordingNotifier::default(),
            &config,
        );

        assert_eq!(monitor.url(), config.document_url());
        assert_eq!(monitor.chat_id, Some(ChatId::Username("@c".into())));
        assert_eq!(monitor.mode, MarkupMode::Html);
        assert!(monitor.send_interval.is_zero());
    }
}
