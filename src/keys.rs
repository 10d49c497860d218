//! Cache Key Schema
//!
//! All accessors build keys through these functions so identical logical
//! queries always map to identical keys. The namespace is shared with other
//! deployments of the service and must stay stable.

// == TTL Policy (seconds) ==
/// TTL policy per resource kind.
pub mod ttl {
    /// Single profile: read-heavy, infrequent self-edits
    pub const PROFILE: u64 = 300;
    /// Profile list and its filtered variants
    pub const PROFILE_LIST: u64 = 180;
    pub const ANNOUNCEMENTS: u64 = 120;
    pub const GALLERY: u64 = 300;
    /// User role / admin flag
    pub const USER_ROLE: u64 = 600;
    pub const CHAT_MESSAGES: u64 = 60;
    pub const AUDIT_LOGS: u64 = 300;
    pub const SESSION: u64 = 3600;
    /// Authenticated login sessions: 7 days
    pub const AUTH_SESSION: u64 = 7 * 24 * 60 * 60;
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Format: profile:{user_id}
    pub fn profile(user_id: &str) -> String {
        format!("profile:{}", user_id)
    }

    /// Pattern covering every single-profile key.
    pub fn profile_pattern() -> &'static str {
        "profile:*"
    }

    /// Format: profiles:all[:{filter_signature}]
    ///
    /// An empty signature maps to the unfiltered list key.
    pub fn profiles(filter_signature: Option<&str>) -> String {
        match filter_signature {
            Some(sig) if !sig.is_empty() => format!("profiles:all:{}", sig),
            _ => "profiles:all".to_string(),
        }
    }

    /// Pattern covering the unfiltered list and every filtered variant.
    pub fn profiles_pattern() -> &'static str {
        "profiles:all*"
    }

    pub fn announcements() -> &'static str {
        "announcements:all"
    }

    pub fn gallery() -> &'static str {
        "gallery:all"
    }

    /// Format: user:role:{user_id}
    pub fn user_role(user_id: &str) -> String {
        format!("user:role:{}", user_id)
    }

    pub fn user_role_pattern() -> &'static str {
        "user:role:*"
    }

    /// Format: chat:messages[:{room_id}]
    pub fn chat_messages(room_id: Option<&str>) -> String {
        match room_id {
            Some(room) if !room.is_empty() => format!("chat:messages:{}", room),
            _ => "chat:messages".to_string(),
        }
    }

    pub fn chat_messages_pattern() -> &'static str {
        "chat:messages*"
    }

    pub fn audit_logs() -> &'static str {
        "audit:logs"
    }

    /// Format: session:{session_id}
    pub fn session(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    /// Format: ratelimit:{subject_id}:{action}
    pub fn rate_limit(subject_id: &str, action: &str) -> String {
        format!("ratelimit:{}:{}", subject_id, action)
    }
}
