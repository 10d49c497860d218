//! Cache Module
//!
//! The cache layer: an in-memory TTL engine, the transport seam
//! ([`CacheClient`]) with in-process and HTTP transports, and the typed
//! fail-open [`Cache`] facade the accessors are built on.

mod client;
mod entry;
mod facade;
mod http;
mod lru;
mod memory;
mod pattern;
mod reconnect;
mod stats;
mod store;


// Re-export public types
pub use client::{CacheClient, KeyTtl};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use facade::Cache;
pub use http::{HttpCache, ADMIN_TOKEN_HEADER};
pub use lru::LruTracker;
pub use memory::MemoryCache;
pub use pattern::glob_match;
pub use reconnect::ReconnectPolicy;
pub use stats::CacheStats;
pub use store::MemoryStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
