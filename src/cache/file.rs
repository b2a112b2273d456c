//! On-disk cache store
//!
//! Stores each value as a JSON file with `cached_at` and `expires_at`
//! timestamps in an XDG-compliant cache directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::store::{expiry_from, CacheError, CacheStore};

/// Sequence number making each in-process temp file name unique
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached value, already serialized by the caller
    value: String,
    /// When the value was cached
    cached_at: DateTime<Utc>,
    /// When the entry expires; `None` keeps it forever
    expires_at: Option<DateTime<Utc>>,
}

/// Cache store persisting entries as JSON files
///
/// Uses `~/.cache/pokefacade/` on Linux. Expired entries read as absent.
#[derive(Debug, Clone)]
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a store in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pokefacade")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a store rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the file backing `key`
    ///
    /// Keys hold `:` separators and arbitrary names, so anything outside
    /// `[a-z0-9_-]` is escaped as `%XX` to keep one key per file.
    fn cache_path(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => file_name.push(byte as char),
                _ => {
                    let _ = write!(file_name, "%{:02X}", byte);
                }
            }
        }
        file_name.push_str(".json");
        self.cache_dir.join(file_name)
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let content = match fs::read_to_string(self.cache_path(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry = serde_json::from_str(&content)?;

        let is_expired = entry.expires_at.is_some_and(|at| Utc::now() > at);
        if is_expired {
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).await?;

        let now = Utc::now();
        let entry = CacheEntry {
            value,
            cached_at: now,
            expires_at: expiry_from(now, ttl_secs),
        };
        let json = serde_json::to_string_pretty(&entry)?;

        // Each write gets its own temp file, then an atomic rename replaces
        // the entry; the last rename wins for concurrent writers of one key
        let path = self.cache_path(key);
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
