//! Reconnect Policy
//!
//! Capped exponential backoff for the remote cache transport.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{CacheError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the second attempt; doubles after each failure
    pub base_delay: Duration,
    /// Cap for a single delay
    pub max_delay: Duration,
    /// Total attempts, including the first one
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(3),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay after the given failed attempt (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Runs `op` until it succeeds, fails with a non-connection error, or the
    /// attempts are exhausted.
    pub async fn retry<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match op().await {
                Err(CacheError::Connection(msg)) => {
                    debug!("{} attempt {}/{} failed: {}", op_name, attempt + 1, attempts, msg);
                    last_error = Some(msg);
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.delay_for(attempt)).await;
                    }
                }
                other => return other,
            }
        }

        let msg = last_error.unwrap_or_default();
        warn!("{} gave up after {} attempts: {}", op_name, attempts, msg);
        Err(CacheError::Connection(format!(
            "{} failed after {} attempts: {}",
            op_name, attempts, msg
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(50));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(5), Duration::from_millis(1600));
        assert_eq!(policy.delay_for(6), Duration::from_secs(3));
        assert_eq!(policy.delay_for(40), Duration::from_secs(3));
    }

    fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = fast_policy(5)
            .retry("probe", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(CacheError::Connection("refused".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_bounded_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = fast_policy(3)
            .retry("probe", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CacheError::Connection("refused".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CacheError::Connection(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_command_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = fast_policy(5)
            .retry("incr", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CacheError::NotAnInteger("k".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CacheError::NotAnInteger(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
