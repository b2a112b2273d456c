//! Cache store port and an in-process implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

/// TTL value meaning "never expire"
pub const NO_EXPIRY: u64 = 0;

/// Errors raised by a cache store
///
/// These never reach callers of `CacheFacade`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem access failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be encoded or decoded
    #[error("cache entry is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    /// Redis command or connection failed
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// Store cannot be reached for another reason
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store holding serialized values
///
/// Implementations must be safe to call concurrently; no ordering between
/// calls for the same key is assumed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`; a `ttl_secs` of `NO_EXPIRY` keeps it forever
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;
}

/// Computes the expiry instant for a TTL, `None` meaning no expiry
pub(crate) fn expiry_from(now: DateTime<Utc>, ttl_secs: u64) -> Option<DateTime<Utc>> {
    if ttl_secs == NO_EXPIRY {
        return None;
    }
    let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    Duration::try_seconds(secs).and_then(|ttl| now.checked_add_signed(ttl))
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Process-local store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at.map_or(true, |at| at > now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        let now = Utc::now();
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at.map_or(true, |at| at > now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let entry = MemoryEntry {
            value,
            expires_at: expiry_from(Utc::now(), ttl_secs),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
