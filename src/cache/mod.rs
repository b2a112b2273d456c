//! Cache layer for upstream responses
//!
//! `CacheStore` is the port to a key/value store (in-memory, on-disk or Redis).
//! `CacheFacade` wraps a store so that every store failure degrades to a cache
//! miss or a silent no-op, with a warning in the logs.

mod facade;
mod file;
mod redis_store;
mod store;

pub use facade::CacheFacade;
pub use file::FileStore;
pub use redis_store::RedisStore;
pub use store::{CacheError, CacheStore, MemoryStore, NO_EXPIRY};

#[cfg(test)]
pub(crate) mod testing;
