//! Rate Limiter
//!
//! Fixed-window counter per (subject, action) built on the cache's atomic
//! increment. The first hit of a window attaches the window as the counter's
//! TTL, so the cache's own expiry resets the window.
//!
//! Known limitation: a burst straddling a window boundary can pass up to
//! twice `limit` within one window length.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{Cache, KeyTtl};
use crate::keys::CacheKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Hits left in the current window
    pub remaining: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Cache,
}

impl RateLimiter {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Counts one hit of `action` by `subject_id` and decides whether it is allowed.
    ///
    /// Fails open: when the cache cannot be reached the hit is allowed.
    pub async fn check(
        &self,
        subject_id: &str,
        action: &str,
        limit: u32,
        window_secs: u64,
    ) -> RateLimitDecision {
        let key = CacheKey::rate_limit(subject_id, action);
        let now = Utc::now();

        let Some(count) = self.cache.incr(&key, Some(window_secs)).await else {
            warn!("rate limit check for {} failed open", key);
            return RateLimitDecision {
                allowed: true,
                remaining: limit,
                reset_at: now + window(window_secs),
            };
        };

        let reset_at = match self.cache.ttl(&key).await {
            KeyTtl::Expires(secs) => now + window(secs),
            KeyTtl::Persistent | KeyTtl::Missing => now + window(window_secs),
        };
        let allowed = count <= i64::from(limit);
        let remaining = u32::try_from((i64::from(limit) - count).max(0)).unwrap_or(0);

        if !allowed {
            debug!("rate limit exceeded for {} ({} > {})", key, count, limit);
        }

        RateLimitDecision {
            allowed,
            remaining,
            reset_at,
        }
    }
}

fn window(secs: u64) -> Duration {
    Duration::seconds(i64::from(u32::try_from(secs).unwrap_or(u32::MAX)))
}
