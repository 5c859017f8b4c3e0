//! Key/value cache backends for check results
//!
//! The results store only needs `get` and `set` with a TTL. Backends report
//! their own failures; the store decides that those failures are misses.

mod file;
mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use file::{DEFAULT_SWEEP_INTERVAL, FileBackend};
pub use memory::MemoryBackend;
#[cfg(feature = "redis")]
pub use self::redis::RedisBackend;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Byte-oriented cache with per-entry expiry
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a live entry (`None` when absent or expired)
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store an entry, replacing any previous value
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}
