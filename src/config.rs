//! Configuration Module
//!
//! Handles loading the cache service and data-layer configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::ReconnectPolicy;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Token required by the flush endpoint; flush is disabled when unset
    pub admin_token: Option<String>,
    /// Base URL of a remote cache service; an in-process cache is used when unset
    pub cache_url: Option<String>,
    /// Connection attempts before the remote cache is declared unreachable
    pub reconnect_attempts: u32,
    /// Upper bound for a single reconnect delay in milliseconds
    pub reconnect_max_delay_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `ADMIN_TOKEN` - Token for `POST /flush` (default: unset)
    /// - `CACHE_URL` - Remote cache service URL (default: unset)
    /// - `CACHE_RECONNECT_ATTEMPTS` - Connection attempts (default: 10)
    /// - `CACHE_RECONNECT_MAX_DELAY_MS` - Backoff cap (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            admin_token: non_empty_var("ADMIN_TOKEN"),
            cache_url: non_empty_var("CACHE_URL"),
            reconnect_attempts: parse_var("CACHE_RECONNECT_ATTEMPTS")
                .unwrap_or(defaults.reconnect_attempts),
            reconnect_max_delay_ms: parse_var("CACHE_RECONNECT_MAX_DELAY_MS")
                .unwrap_or(defaults.reconnect_max_delay_ms),
        }
    }

    /// Backoff policy for the remote cache transport.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_delay: Duration::from_millis(self.reconnect_max_delay_ms),
            max_attempts: self.reconnect_attempts.max(1),
            ..ReconnectPolicy::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            server_port: 3000,
            cleanup_interval: 1,
            admin_token: None,
            cache_url: None,
            reconnect_attempts: 10,
            reconnect_max_delay_ms: 3000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
