//! Background Tasks
//!
//! - TTL cleanup: sweeps expired entries of the in-process cache
//! - Cache warmer: pre-populates hot keys, fire-and-forget

mod cleanup;
mod warmer;

pub use cleanup::spawn_cleanup_task;
pub use warmer::CacheWarmer;
