//! Typed Cache Facade
//!
//! Wraps an injected [`CacheClient`] with JSON (de)serialization and the
//! failure policy of the cache layer: reads fail open (treated as a miss),
//! writes fail silent (logged, reported as `false`). Callers never see a
//! cache error.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheClient, HttpCache, KeyTtl, MemoryCache};
use crate::config::Config;
use crate::error::Result;

#[derive(Clone)]
pub struct Cache {
    client: Arc<dyn CacheClient>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.client.backend_name())
            .finish()
    }
}

impl Cache {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self { client }
    }

    /// Cache backed by a private in-process store.
    pub fn in_memory(max_entries: usize) -> Self {
        Self::new(Arc::new(MemoryCache::new(max_entries)))
    }

    /// Remote cache when `cache_url` is configured, otherwise in-process.
    ///
    /// This is the one place a cache error is fatal: a remote cache that
    /// never answers its connection probe is reported to the caller.
    pub async fn from_config(config: &Config) -> Result<Self> {
        match &config.cache_url {
            Some(url) => {
                let remote =
                    HttpCache::connect(url, config.reconnect_policy(), config.admin_token.clone())
                        .await?;
                Ok(Self::new(Arc::new(remote)))
            }
            None => Ok(Self::in_memory(config.max_entries)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.client.backend_name()
    }

    // == Get ==
    /// Deserialized value, or None when absent, expired, unreadable or the
    /// transport failed.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.client.get(key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache get failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // Left in place; the next populate overwrites it
                warn!(key, error = %err, "malformed cache entry, treating as miss");
                None
            }
        }
    }

    // == Set ==
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_secs: Option<u64>) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "cache value could not be serialized");
                return false;
            }
        };

        match self.client.set(key, raw, ttl_secs).await {
            Ok(()) => {
                debug!("cache set {} (ttl {:?})", key, ttl_secs);
                true
            }
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache set failed");
                false
            }
        }
    }

    // == Delete ==
    /// True when the command reached the cache, whether or not the key existed.
    pub async fn del(&self, key: &str) -> bool {
        match self.client.del(key).await {
            Ok(_) => true,
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache del failed");
                false
            }
        }
    }

    /// True only when a key was actually removed; failures read as false.
    pub async fn remove(&self, key: &str) -> bool {
        match self.client.del(key).await {
            Ok(deleted) => deleted,
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache del failed");
                false
            }
        }
    }

    pub async fn del_pattern(&self, pattern: &str) -> bool {
        match self.client.del_pattern(pattern).await {
            Ok(count) => {
                debug!("cache invalidated {} keys matching {}", count, pattern);
                true
            }
            Err(err) => {
                warn!(backend = self.backend_name(), pattern, error = %err, "cache pattern delete failed");
                false
            }
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.client.exists(key).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache exists failed");
                false
            }
        }
    }

    // == Increment ==
    /// New counter value, or None when the transport failed.
    pub async fn incr(&self, key: &str, ttl_on_create: Option<u64>) -> Option<i64> {
        match self.client.incr(key, ttl_on_create).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache incr failed");
                None
            }
        }
    }

    /// Remaining lifetime; a failed lookup reports `KeyTtl::Missing`.
    pub async fn ttl(&self, key: &str) -> KeyTtl {
        match self.client.ttl(key).await {
            Ok(ttl) => ttl,
            Err(err) => {
                warn!(backend = self.backend_name(), key, error = %err, "cache ttl failed");
                KeyTtl::Missing
            }
        }
    }

    // == Flush ==
    /// Clears the whole shared namespace. Administrative use only.
    pub async fn flush(&self) -> bool {
        match self.client.flush().await {
            Ok(count) => {
                warn!(backend = self.backend_name(), "cache flushed, {} keys dropped", count);
                true
            }
            Err(err) => {
                warn!(backend = self.backend_name(), error = %err, "cache flush failed");
                false
            }
        }
    }
}
