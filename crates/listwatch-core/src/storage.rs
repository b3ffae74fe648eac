use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::{Error, Result, SnapshotMeta};

/// File name of the persisted snapshot inside the state directory.
pub const SNAPSHOT_FILE: &str = "README.md";
/// File name of the snapshot metadata inside the state directory.
pub const META_FILE: &str = "snapshot.json";
/// File name of the advisory run lock inside the state directory.
pub const LOCK_FILE: &str = ".listwatch.lock";

/// Abstraction over snapshot persistence used by the monitor.
pub trait SnapshotStore {
    /// Guard held for the duration of a run; dropping it releases the lock.
    type Guard;

    /// Take the exclusive run lock, failing if another run holds it.
    fn lock(&self) -> Result<Self::Guard>;
    /// Load the previous snapshot, `None` when no run has stored one yet.
    fn load_snapshot(&self) -> Result<Option<String>>;
    /// Replace the stored snapshot.
    fn save_snapshot(&self, content: &str) -> Result<()>;
    /// Load snapshot metadata, `None` when missing or unreadable.
    fn load_meta(&self) -> Result<Option<SnapshotMeta>>;
    /// Replace the snapshot metadata.
    fn save_meta(&self, meta: &SnapshotMeta) -> Result<()>;
}

/// Snapshot storage in a local state directory
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("Failed to create state directory: {e}")))?;
        Ok(Self { dir })
    }

    /// Opens a store rooted at `dir` without touching the filesystem.
    ///
    /// Reads from a missing directory behave like an empty store. Use this for
    /// read-only callers; writes fail until the directory exists.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the state directory path
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the persisted snapshot
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// Returns the path of the snapshot metadata
    #[must_use]
    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

impl SnapshotStore for FileSnapshotStore {
    type Guard = RunLock;

    fn lock(&self) -> Result<RunLock> {
        RunLock::acquire(&self.lock_path())
    }

    fn load_snapshot(&self) -> Result<Option<String>> {
        let path = self.snapshot_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Storage(format!(
                "Failed to read snapshot at {}: {err}",
                path.display()
            ))),
        }
    }

    fn save_snapshot(&self, content: &str) -> Result<()> {
        let path = self.snapshot_path();
        write_atomic(&path, content.as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to write snapshot: {e}")))?;
        debug!("Saved snapshot ({} bytes) to {}", content.len(), path.display());
        Ok(())
    }

    fn load_meta(&self) -> Result<Option<SnapshotMeta>> {
        let path = self.meta_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::Storage(format!(
                    "Failed to read snapshot metadata: {err}"
                )));
            },
        };

        match serde_json::from_str::<SnapshotMeta>(&raw) {
            Ok(meta) => Ok(Some(meta)),
            Err(err) => {
                // Metadata only drives conditional requests; a bad file just
                // means the next fetch is unconditional.
                warn!("Ignoring unreadable snapshot metadata at {}: {err}", path.display());
                Ok(None)
            },
        }
    }

    fn save_meta(&self, meta: &SnapshotMeta) -> Result<()> {
        let json = serde_json::to_string_pretty(meta)?;
        write_atomic(&self.meta_path(), json.as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to write snapshot metadata: {e}")))
    }
}

/// Exclusive advisory lock held across one watch run.
///
/// Overlapping invocations (for example a slow run and the next cron tick)
/// would otherwise race on the read-modify-write of the snapshot.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to take the lock at `path` without blocking.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::Storage(format!("Failed to open lock file: {e}")))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired run lock at {}", path.display());
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                })
            },
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                Err(Error::Storage(format!(
                    "Another run is in progress (lock held at {})",
                    path.display()
                )))
            },
            Err(err) => Err(Error::Storage(format!("Failed to lock {}: {err}", path.display()))),
        }
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!("Failed to release run lock at {}: {err}", self.path.display());
        }
    }
}

/// Write `bytes` to `path` through a synced temp file and a rename, so a crash
/// leaves either the old or the new content.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let write_result = (|| {
        let mut tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(bytes)?;
        tmp.sync_all()
    })();
    if let Err(err) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        // Clean up temp file on failure to avoid accumulating stale files.
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    #[cfg(unix)]
    if let Some(parent) = path.parent() {
        if let Ok(dir) = OpenOptions::new().read(true).open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}
