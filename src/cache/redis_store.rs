//! Redis-backed cache store
//!
//! Shared across processes. `NO_EXPIRY` writes use plain `SET`, positive TTLs
//! use `SET ... EX`. Eviction is left to the Redis server's policy.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;
use tokio::sync::OnceCell;
use tracing::debug;

use super::store::{CacheError, CacheStore, NO_EXPIRY};

/// Cache store talking to a Redis server
///
/// The connection is opened on first use and shared by all callers.
pub struct RedisStore {
    client: Client,
    connection: OnceCell<MultiplexedConnection>,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Creates a store for the given `redis://` URL
    ///
    /// Only the URL is validated here; no connection is made until the first
    /// command.
    pub fn open(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            key_prefix: String::new(),
        })
    }

    /// Namespaces every key, e.g. `"pokefacade:"`
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                debug!("opening redis connection");
                self.client.get_multiplexed_async_connection().await
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(self.full_key(key))
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.full_key(key)).arg(value);
        if ttl_secs != NO_EXPIRY {
            cmd.arg("EX").arg(ttl_secs);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }
}
