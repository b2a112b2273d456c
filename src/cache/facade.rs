//! Fault-tolerant wrapper around a `CacheStore`

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::store::CacheStore;

/// Typed, never-failing access to a shared cache store
///
/// Read failures and undecodable entries become misses; write failures are
/// dropped. Both are logged at warn level. Cloning shares the store.
#[derive(Clone)]
pub struct CacheFacade {
    store: Arc<dyn CacheStore>,
}

impl std::fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFacade").finish_non_exhaustive()
    }
}

impl CacheFacade {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Reads and decodes the value under `key`
    ///
    /// Returns `None` on a miss, on any store failure, or if the stored JSON
    /// does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(error) => {
                warn!(key, %error, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(error) => {
                warn!(key, %error, "cached entry does not decode, treating as miss");
                None
            }
        }
    }

    /// Encodes and stores `value` under `key`, best-effort
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key, %error, "could not encode value for cache");
                return;
            }
        };

        if let Err(error) = self.store.set(key, raw, ttl_secs).await {
            warn!(key, %error, "cache write failed, continuing without cache");
        }
    }
}
