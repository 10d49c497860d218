//! Session accessor.
//!
//! Sessions live only in the cache; the entry's TTL is the session lifetime.
//! Losing the cache logs everybody out, which is accepted.

use chrono::{Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::Cache;
use crate::keys::{ttl, CacheKey};
use crate::models::{Session, SessionKind};

fn lifetime(kind: SessionKind) -> u64 {
    match kind {
        SessionKind::Standard => ttl::SESSION,
        SessionKind::Auth => ttl::AUTH_SESSION,
    }
}

#[derive(Debug, Clone)]
pub struct SessionAccessor {
    cache: Cache,
}

impl SessionAccessor {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Opens a session. None when the cache refused the write, since a
    /// session that was never stored cannot be resumed.
    pub async fn create(&self, user_id: &str, kind: SessionKind) -> Option<Session> {
        let secs = lifetime(kind);
        let now = Utc::now();
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            created_at: now,
            expires_at: now + Duration::seconds(secs as i64),
        };

        let key = CacheKey::session(&session.session_id);
        if !self.cache.set(&key, &session, Some(secs)).await {
            warn!("session for {} could not be stored", user_id);
            return None;
        }
        debug!("session {} opened for {}", session.session_id, user_id);
        Some(session)
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let key = CacheKey::session(session_id);
        let session: Session = self.cache.get(&key).await?;

        if session.is_expired_at(Utc::now()) {
            self.cache.del(&key).await;
            return None;
        }
        Some(session)
    }

    /// Restarts the session's lifetime from now.
    pub async fn extend(&self, session_id: &str) -> Option<Session> {
        let mut session = self.get(session_id).await?;
        let secs = lifetime(session.kind);
        session.expires_at = Utc::now() + Duration::seconds(secs as i64);

        let key = CacheKey::session(session_id);
        if !self.cache.set(&key, &session, Some(secs)).await {
            return None;
        }
        Some(session)
    }

    /// True when a session was removed.
    pub async fn destroy(&self, session_id: &str) -> bool {
        self.cache.remove(&CacheKey::session(session_id)).await
    }
}
