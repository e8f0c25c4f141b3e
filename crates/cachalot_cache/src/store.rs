use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tokio::fs;
use tracing::{debug, warn};

use crate::key::CacheKey;
use crate::policy::FreshnessPolicy;

/// Distinguishes in-progress temp files from entry files.
const TMP_SUFFIX: &str = ".tmp";

/// Counter for unique temp file names within the process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Result of a cache probe. Callers treat `Stale` exactly like `Miss`;
/// the distinction only matters for logging.
#[derive(Debug)]
pub enum Lookup {
    Miss,
    Stale,
    Fresh(Vec<u8>),
}

/// One file per key under `dir`; mtime is the freshness clock.
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Opens the store, creating the cache directory if absent.
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    /// Probes the entry for `key`, applying the freshness policy to the
    /// file's modification time. Only fresh entries are read.
    pub async fn lookup(&self, key: &CacheKey, policy: &FreshnessPolicy) -> Lookup {
        let path = self.entry_path(key);

        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(_) => return Lookup::Miss,
        };
        let Ok(stored_at) = meta.modified() else {
            return Lookup::Miss;
        };

        if !policy.is_fresh(stored_at) {
            debug!(target: "cachalot::cache", %key, "entry expired");
            return Lookup::Stale;
        }

        match fs::read(&path).await {
            Ok(payload) => Lookup::Fresh(payload),
            // Lost a race with a concurrent replacement; treat as a miss.
            Err(e) => {
                warn!(target: "cachalot::cache", %key, error = ?e, "failed to read entry");
                Lookup::Miss
            }
        }
    }

    /// Creates or overwrites the entry for `key`. The payload is written to
    /// a temp file in the same directory and renamed over the entry, so
    /// readers never observe a partial write; concurrent writers race and
    /// the last rename wins.
    pub async fn insert(&self, key: &CacheKey, payload: &[u8]) -> anyhow::Result<()> {
        let path = self.entry_path(key);
        let tmp = self.dir.join(format!(
            "{key}.{}-{}{TMP_SUFFIX}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        ));

        fs::write(&tmp, payload).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(target: "cachalot::cache", %key, bytes = payload.len(), "entry stored");
        Ok(())
    }

    /// Bounds the cache at `max_entries` entry files, removing the
    /// oldest-modified entries first. Best effort: scan or removal errors
    /// are logged, never propagated.
    pub async fn enforce_capacity(&self, max_entries: usize) {
        let mut entries: Vec<(SystemTime, PathBuf)> = Vec::new();

        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) => {
                warn!(target: "cachalot::cache", error = ?e, "failed to scan cache directory");
                return;
            }
        };

        while let Ok(Some(item)) = dir.next_entry().await {
            let name = item.file_name();
            if name.to_string_lossy().ends_with(TMP_SUFFIX) {
                continue;
            }
            let Ok(meta) = item.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Ok(modified) = meta.modified() else {
                continue;
            };
            entries.push((modified, item.path()));
        }

        if entries.len() <= max_entries {
            return;
        }

        entries.sort_by_key(|(modified, _)| *modified);
        let excess = entries.len() - max_entries;
        for (_, path) in entries.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path).await {
                warn!(target: "cachalot::cache", path = %path.display(), error = ?e, "failed to evict entry");
            } else {
                debug!(target: "cachalot::cache", path = %path.display(), "evicted entry");
            }
        }
    }
}
