//! Redis cache backend (feature `redis`)

use super::CacheBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::debug;

/// Per-command timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(250);

/// Redis-backed cache, sharing results across hosts
///
/// The connection is opened lazily on first use and reused afterwards.
pub struct RedisBackend {
    client: redis::Client,
    connection: OnceCell<MultiplexedConnection>,
    timeout: Duration,
}

impl RedisBackend {
    /// Create a backend for `url` (e.g. `redis://127.0.0.1/`)
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the URL cannot be parsed.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Config(format!("invalid redis url {url}: {e}")))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-command timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                debug!("opening redis connection");
                timeout(self.timeout, self.client.get_multiplexed_async_connection())
                    .await
                    .map_err(|_| Error::Cache("redis connect timeout".to_string()))?
                    .map_err(|e| Error::Cache(format!("redis connect failed: {e}")))
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        timeout(self.timeout, conn.get::<_, Option<Vec<u8>>>(key))
            .await
            .map_err(|_| Error::Cache("redis timeout".to_string()))?
            .map_err(|e| Error::Cache(format!("redis GET failed: {e}")))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let secs = ttl.as_secs().max(1);
        timeout(self.timeout, conn.set_ex::<_, _, ()>(key, value, secs))
            .await
            .map_err(|_| Error::Cache("redis timeout".to_string()))?
            .map_err(|e| Error::Cache(format!("redis SET failed: {e}")))
    }
}
