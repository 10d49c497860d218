//! Cache Client Trait
//!
//! The transport seam between the typed cache facade and a concrete cache
//! (in-process engine or remote cache service).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// == Key TTL ==
/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyTtl {
    /// Seconds until expiry, rounded up
    Expires(u64),
    /// Key exists without expiry
    Persistent,
    /// Key does not exist
    Missing,
}

impl KeyTtl {
    /// Redis-style integer form: seconds, `-1` for no expiry, `-2` for absent.
    pub fn as_seconds(&self) -> i64 {
        match self {
            KeyTtl::Expires(secs) => i64::try_from(*secs).unwrap_or(i64::MAX),
            KeyTtl::Persistent => -1,
            KeyTtl::Missing => -2,
        }
    }

    /// Inverse of [`KeyTtl::as_seconds`]; any other negative value is `Missing`.
    pub fn from_seconds(secs: i64) -> Self {
        match secs {
            -1 => KeyTtl::Persistent,
            s if s < 0 => KeyTtl::Missing,
            s => KeyTtl::Expires(s.unsigned_abs()),
        }
    }
}

// == Cache Client ==
/// Raw string-valued cache operations.
///
/// Implementations report every failure; the fail-open policy lives in
/// [`crate::cache::Cache`]. Shared as `Arc<dyn CacheClient>`.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Live value for the key, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value; `ttl_secs = None` never expires.
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<()>;

    /// Removes a key, returning whether it existed.
    async fn del(&self, key: &str) -> Result<bool>;

    /// Removes every key matching a glob, returning the count.
    async fn del_pattern(&self, pattern: &str) -> Result<usize>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Atomic increment; the TTL applies only when the counter is created.
    async fn incr(&self, key: &str, ttl_on_create: Option<u64>) -> Result<i64>;

    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Clears the whole namespace, returning the number of dropped keys.
    async fn flush(&self) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ttl_sentinels() {
        assert_eq!(KeyTtl::Expires(42).as_seconds(), 42);
        assert_eq!(KeyTtl::Persistent.as_seconds(), -1);
        assert_eq!(KeyTtl::Missing.as_seconds(), -2);

        assert_eq!(KeyTtl::from_seconds(42), KeyTtl::Expires(42));
        assert_eq!(KeyTtl::from_seconds(-1), KeyTtl::Persistent);
        assert_eq!(KeyTtl::from_seconds(-2), KeyTtl::Missing);
        assert_eq!(KeyTtl::from_seconds(-9), KeyTtl::Missing);
    }
}
