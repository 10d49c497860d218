//! Alumni Cache - cache-aside data access for an alumni community portal
//!
//! A Redis-style cache engine (TTL expiry, LRU eviction, glob invalidation,
//! atomic counters) served over HTTP, a fail-open typed cache facade with an
//! in-process and a remote transport, and per-resource accessors that read
//! through the cache and invalidate it after store writes.

pub mod access;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod ratelimit;
pub mod store;
pub mod tasks;

pub use access::{DataLayer, Fetched, Provenance};
pub use api::{create_router, AppState};
pub use cache::{Cache, CacheClient, HttpCache, KeyTtl, MemoryCache};
pub use config::Config;
pub use error::{CacheError, StoreError};
pub use keys::CacheKey;
pub use ratelimit::{RateLimitDecision, RateLimiter};
pub use store::{BackingStore, MemoryBackingStore};
pub use tasks::{spawn_cleanup_task, CacheWarmer};
