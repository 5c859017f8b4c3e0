//! On-disk cache backend
//!
//! One JSON envelope per key under a cache directory. Writes go through a
//! temporary file and a rename so readers never observe half-written entries.
//! Expired entries are removed when read and by a periodic sweep run from
//! `set`, so keys that are never read again do not pile up.

use super::CacheBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::debug;

/// Directory name used under the platform cache dir
const CACHE_DIR: &str = "mr-mergeability";

/// Default minimum time between two sweeps of the cache directory
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Serialize, Deserialize)]
struct Envelope {
    expires_at: DateTime<Utc>,
    value: String,
}

/// Filesystem-backed cache shared by every process on the host
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    sweep_interval: Duration,
    last_sweep: Arc<Mutex<Option<Instant>>>,
}

impl FileBackend {
    /// Use `dir` as the cache directory (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            last_sweep: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the minimum time between sweeps (`Duration::ZERO` sweeps on every write)
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Default location: `<cache dir>/mr-mergeability`
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the platform has no cache directory.
    pub fn default_location() -> Result<Self> {
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::Config("no cache directory on this platform".to_string()))?;
        Ok(Self::new(base.join(CACHE_DIR)))
    }

    /// Directory holding the entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    /// Delete every expired entry in the cache directory
    ///
    /// Unreadable or unparseable files are left alone. Returns how many
    /// entries were removed.
    ///
    /// # Errors
    /// Returns [`Error::Cache`] when the directory cannot be listed.
    pub async fn sweep_expired(&self) -> Result<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(Error::Cache(format!(
                    "failed to list {}: {e}",
                    self.dir.display()
                )));
            }
        };

        let now = Utc::now();
        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::Cache(format!("failed to list {}: {e}", self.dir.display())))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Ok(content) = fs::read(&path).await else {
                continue;
            };
            let Ok(envelope) = serde_json::from_slice::<Envelope>(&content) else {
                continue;
            };
            if envelope.expires_at <= now && fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }

        debug!(dir = %self.dir.display(), removed, "swept file cache");
        Ok(removed)
    }

    /// Claim the next sweep if the interval has elapsed
    fn sweep_due(&self) -> bool {
        let mut last = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
        let due = last.is_none_or(|at| at.elapsed() >= self.sweep_interval);
        if due {
            *last = Some(Instant::now());
        }
        due
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(key);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Cache(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let envelope: Envelope = serde_json::from_slice(&content)
            .map_err(|e| Error::Cache(format!("failed to parse {}: {e}", path.display())))?;

        if envelope.expires_at <= Utc::now() {
            debug!(key, "file cache entry expired");
            // Expired entries are garbage; losing the race to delete is fine
            let _ = fs::remove_file(&path).await;
            return Ok(None);
        }

        STANDARD
            .decode(envelope.value)
            .map(Some)
            .map_err(|e| Error::Cache(format!("failed to decode {}: {e}", path.display())))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Cache(format!("failed to create {}: {e}", self.dir.display()))
        })?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Cache(format!("ttl out of range: {e}")))?;
        let envelope = Envelope {
            expires_at: Utc::now() + ttl,
            value: STANDARD.encode(value),
        };
        let content = serde_json::to_vec(&envelope)?;

        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| Error::Cache(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Cache(format!("failed to move {}: {e}", path.display())))?;

        if self.sweep_due()
            && let Err(e) = self.sweep_expired().await
        {
            debug!(error = %e, "file cache sweep failed");
        }

        Ok(())
    }
}
