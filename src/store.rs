//! Results store - cached check results keyed by check cache key
//!
//! The cache is an optimization, never a correctness dependency: every
//! backend or decoding failure is logged and treated as a miss, and write
//! failures are swallowed.

use crate::cache::CacheBackend;
use crate::checks::{CacheKey, CheckResult, StoredResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Bump when the stored `{status, payload}` shape changes
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Lifetime of conclusive results
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Lifetime of `Checking` results, so pending states get re-polled
pub const DEFAULT_CHECKING_TTL: Duration = Duration::from_secs(60);

/// Key prefix shared by all entries
pub const DEFAULT_NAMESPACE: &str = "mergeability";

/// Cache of check results over a [`CacheBackend`]
#[derive(Clone)]
pub struct ResultsStore {
    backend: Arc<dyn CacheBackend>,
    namespace: String,
    ttl: Duration,
    checking_ttl: Duration,
}

impl ResultsStore {
    /// Create a store with default TTLs and namespace
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl: DEFAULT_TTL,
            checking_ttl: DEFAULT_CHECKING_TTL,
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn with_checking_ttl(mut self, ttl: Duration) -> Self {
        self.checking_ttl = ttl;
        self
    }

    /// Full backend key: `{namespace}:{cache key}:v{schema version}`
    pub fn versioned_key(&self, key: &CacheKey) -> String {
        format!("{}:{}:v{}", self.namespace, key, CACHE_SCHEMA_VERSION)
    }

    /// TTL applied to a result when it is written
    pub fn ttl_for(&self, result: &CheckResult) -> Duration {
        if result.is_checking() {
            self.checking_ttl
        } else {
            self.ttl
        }
    }

    /// Look up a cached result; `None` on miss or on any failure
    pub async fn read(&self, key: &CacheKey) -> Option<CheckResult> {
        let full_key = self.versioned_key(key);

        let bytes = match self.backend.get(&full_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(cache_key = %full_key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(cache_key = %full_key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let stored: StoredResult = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(cache_key = %full_key, error = %e, "malformed cache entry, treating as miss");
                return None;
            }
        };

        match CheckResult::from_stored(stored) {
            Ok(result) => {
                debug!(cache_key = %full_key, status = %result.status(), "cache hit");
                Some(result)
            }
            Err(e) => {
                warn!(cache_key = %full_key, error = %e, "invalid cache entry, treating as miss");
                None
            }
        }
    }

    /// Persist a result (best effort)
    pub async fn write(&self, key: &CacheKey, result: &CheckResult) {
        let full_key = self.versioned_key(key);

        let bytes = match serde_json::to_vec(&result.to_stored()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(cache_key = %full_key, error = %e, "failed to serialize check result");
                return;
            }
        };

        let ttl = self.ttl_for(result);
        if let Err(e) = self.backend.set(&full_key, bytes, ttl).await {
            warn!(cache_key = %full_key, error = %e, "cache write failed");
        } else {
            debug!(cache_key = %full_key, ttl_secs = ttl.as_secs(), "cached check result");
        }
    }
}

impl std::fmt::Debug for ResultsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsStore")
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .field("checking_ttl", &self.checking_ttl)
            .finish_non_exhaustive()
    }
}
