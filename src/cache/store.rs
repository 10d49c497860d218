//! Cache Store Module
//!
//! In-memory cache engine: HashMap storage with LRU tracking, TTL expiration,
//! glob deletion and atomic counters.

use std::collections::HashMap;

use crate::cache::{
    glob_match, CacheEntry, CacheStats, KeyTtl, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::error::{CacheError, Result};

// == Memory Store ==
/// Cache storage with LRU eviction and TTL support.
///
/// Not synchronized; transports wrap it in `Arc<RwLock<_>>`.
#[derive(Debug)]
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` keys (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous value and expiry for the key.
    ///
    /// `ttl = None` stores the entry without expiry.
    pub fn set(&mut self, key: String, value: String, ttl: Option<u64>) -> Result<()> {
        validate_key(&key)?;
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        self.insert_entry(key, CacheEntry::new(value, ttl))
    }

    // == Get ==
    /// Retrieves a live value. Expired entries are removed and count as misses.
    pub fn get(&mut self, key: &str) -> Result<String> {
        if self.purge_if_expired(key) {
            self.stats.record_miss();
            return Err(CacheError::Expired(key.to_string()));
        }

        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Ok(value)
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Delete ==
    /// Removes a key, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Delete Pattern ==
    /// Removes every key matching the glob, returning how many were removed.
    pub fn delete_pattern(&mut self, pattern: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.set_total_entries(self.entries.len());
        matching.len()
    }

    // == Exists ==
    pub fn exists(&mut self, key: &str) -> bool {
        !self.purge_if_expired(key) && self.entries.contains_key(key)
    }

    // == Increment ==
    /// Atomically increments an integer counter.
    ///
    /// A missing or expired key starts at 1 and receives `ttl_on_create`;
    /// later increments keep the existing expiry.
    pub fn incr(&mut self, key: &str, ttl_on_create: Option<u64>) -> Result<i64> {
        validate_key(key)?;
        self.purge_if_expired(key);

        if let Some(entry) = self.entries.get_mut(key) {
            let current: i64 = entry
                .value
                .trim()
                .parse()
                .map_err(|_| CacheError::NotAnInteger(key.to_string()))?;
            let next = current.checked_add(1).ok_or_else(|| {
                CacheError::InvalidRequest(format!("Increment of '{}' would overflow", key))
            })?;
            entry.replace_value(next.to_string());
            self.lru.touch(key);
            return Ok(next);
        }

        self.insert_entry(key.to_string(), CacheEntry::new("1".to_string(), ttl_on_create))?;
        Ok(1)
    }

    // == TTL ==
    pub fn ttl(&mut self, key: &str) -> KeyTtl {
        if self.purge_if_expired(key) {
            return KeyTtl::Missing;
        }
        match self.entries.get(key) {
            Some(entry) => match entry.ttl_remaining_secs() {
                Some(secs) => KeyTtl::Expires(secs),
                None => KeyTtl::Persistent,
            },
            None => KeyTtl::Missing,
        }
    }

    // == Flush ==
    /// Removes every entry, returning how many were dropped.
    pub fn flush(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry, evicting the least recently used key when a new key
    /// would exceed capacity.
    fn insert_entry(&mut self, key: String, entry: CacheEntry) -> Result<()> {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "Cache is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    /// Drops the entry if its TTL has elapsed. Returns true when it did.
    fn purge_if_expired(&mut self, key: &str) -> bool {
        let expired = self.entries.get(key).is_some_and(CacheEntry::is_expired);
        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
        }
        expired
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
