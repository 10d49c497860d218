//! Request DTOs for the cache service API
//!
//! Shared by the axum handlers and the HTTP cache transport.

use serde::{Deserialize, Serialize};

use crate::cache::MAX_KEY_LENGTH;

/// Request body for PUT /set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Serialized payload to store
    pub value: String,
    /// Optional TTL in seconds; omitted means no expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for POST /del-pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRequest {
    pub pattern: String,
}

impl PatternRequest {
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /incr
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrRequest {
    pub key: String,
    /// Expiry applied only when the counter is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl IncrRequest {
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}
