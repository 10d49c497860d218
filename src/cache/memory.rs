//! In-process cache transport over the shared [`MemoryStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheClient, CacheStats, KeyTtl, MemoryStore};
use crate::error::{CacheError, Result};

/// Cheap to clone; all clones share one store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self::from_shared(Arc::new(RwLock::new(MemoryStore::new(max_entries))))
    }

    /// Wraps a store that is also handed to the cleanup task or the HTTP API.
    pub fn from_shared(store: Arc<RwLock<MemoryStore>>) -> Self {
        Self { store }
    }

    pub fn shared(&self) -> Arc<RwLock<MemoryStore>> {
        Arc::clone(&self.store)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        // Write lock: reads update LRU order and stats
        let mut store = self.store.write().await;
        match store.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(CacheError::NotFound(_)) | Err(CacheError::Expired(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<()> {
        self.store.write().await.set(key.to_string(), value, ttl_secs)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        Ok(self.store.write().await.delete(key))
    }

    async fn del_pattern(&self, pattern: &str) -> Result<usize> {
        Ok(self.store.write().await.delete_pattern(pattern))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.write().await.exists(key))
    }

    async fn incr(&self, key: &str, ttl_on_create: Option<u64>) -> Result<i64> {
        self.store.write().await.incr(key, ttl_on_create)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        Ok(self.store.write().await.ttl(key))
    }

    async fn flush(&self) -> Result<usize> {
        Ok(self.store.write().await.flush())
    }
}
