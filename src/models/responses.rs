//! Response DTOs for the cache service API

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;

/// Response body for GET /get/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for PUT /set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /del/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub key: String,
    /// Whether the key existed
    pub deleted: bool,
}

/// Response body for POST /del-pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePatternResponse {
    pub pattern: String,
    /// Number of keys removed
    pub deleted: usize,
}

/// Response body for GET /exists/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for POST /incr
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrResponse {
    pub key: String,
    pub value: i64,
}

/// Response body for GET /ttl/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlResponse {
    pub key: String,
    /// Seconds remaining, `-1` without expiry, `-2` when absent
    pub ttl: i64,
}

/// Response body for POST /flush
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushResponse {
    pub flushed: usize,
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
