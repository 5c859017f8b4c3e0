//! Configuration loaded from `config.toml`
//!
//! Missing file means defaults. Check names are validated when the runner is
//! built, so a typo in `checks` fails loudly instead of silently dropping a
//! check.

use crate::cache::{CacheBackend, DEFAULT_SWEEP_INTERVAL, FileBackend, MemoryBackend};
use crate::checks::{CheckKind, CheckList};
use crate::error::{Error, Result};
use crate::platform::DEFAULT_TIMEOUT_SECS;
use crate::runner::MergeabilityCheckRunner;
use crate::store::{DEFAULT_CHECKING_TTL, DEFAULT_NAMESPACE, DEFAULT_TTL, ResultsStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Directory name under the platform config/cache dirs
pub const APP_DIR: &str = "mr-mergeability";

/// Filename of the configuration file
const CONFIG_FILE: &str = "config.toml";

/// Which cache backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process only; nothing survives the command
    Memory,
    /// One file per entry under `path`
    #[default]
    File,
    /// Shared redis instance (requires the `redis` feature)
    Redis,
}

/// `[cache]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub backend: BackendKind,
    /// Lifetime of conclusive results
    pub ttl_secs: u64,
    /// Lifetime of `checking` results
    pub checking_ttl_secs: u64,
    pub namespace: String,
    /// Directory for the file backend
    pub path: Option<PathBuf>,
    /// Minimum time between sweeps of expired file entries
    pub sweep_interval_secs: u64,
    /// Connection URL for the redis backend
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            ttl_secs: DEFAULT_TTL.as_secs(),
            checking_ttl_secs: DEFAULT_CHECKING_TTL.as_secs(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
            redis_url: None,
        }
    }
}

/// `[gitlab]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabConfig {
    /// Instance host; `None` means gitlab.com
    pub host: Option<String>,
    /// Environment variable checked first for the token
    pub token_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: None,
            token_env: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GitLabConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Checks to run, in order (config names or identifiers)
    pub checks: Vec<String>,
    pub cache: CacheConfig,
    pub gitlab: GitLabConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checks: CheckKind::ALL.iter().map(|k| k.name().to_string()).collect(),
            cache: CacheConfig::default(),
            gitlab: GitLabConfig::default(),
        }
    }
}

/// Default config file location (`<config dir>/mr-mergeability/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from `path`, or from the default location
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        debug!(path = %path.display(), checks = config.checks.len(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validated, ordered check list
    pub fn check_list(&self) -> Result<CheckList> {
        CheckList::from_names(&self.checks)
    }

    /// Instantiate the configured cache backend
    pub fn backend(&self) -> Result<Arc<dyn CacheBackend>> {
        match self.cache.backend {
            BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
            BackendKind::File => {
                let backend = match &self.cache.path {
                    Some(dir) => FileBackend::new(dir.clone()),
                    None => FileBackend::default_location()?,
                };
                Ok(Arc::new(backend.with_sweep_interval(Duration::from_secs(
                    self.cache.sweep_interval_secs,
                ))))
            }
            BackendKind::Redis => self.redis_backend(),
        }
    }

    #[cfg(feature = "redis")]
    fn redis_backend(&self) -> Result<Arc<dyn CacheBackend>> {
        let url = self
            .cache
            .redis_url
            .as_deref()
            .ok_or_else(|| Error::Config("cache.redis_url is required for redis backend".into()))?;
        Ok(Arc::new(crate::cache::RedisBackend::new(url)?))
    }

    #[cfg(not(feature = "redis"))]
    #[allow(clippy::unused_self)]
    fn redis_backend(&self) -> Result<Arc<dyn CacheBackend>> {
        Err(Error::Config(
            "redis backend requested but built without the `redis` feature".to_string(),
        ))
    }

    /// Results store over the configured backend
    pub fn results_store(&self) -> Result<ResultsStore> {
        Ok(ResultsStore::new(self.backend()?)
            .with_namespace(self.cache.namespace.clone())
            .with_ttl(Duration::from_secs(self.cache.ttl_secs))
            .with_checking_ttl(Duration::from_secs(self.cache.checking_ttl_secs)))
    }

    /// Runner wired to the configured checks and cache
    pub fn runner(&self) -> Result<MergeabilityCheckRunner> {
        Ok(MergeabilityCheckRunner::new(
            self.check_list()?,
            self.results_store()?,
        ))
    }
}
