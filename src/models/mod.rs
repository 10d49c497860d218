//! Data models
//!
//! Resource records held by the backing store, plus the DTOs used for the
//! cache service's HTTP request and response bodies.

pub mod records;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use records::{
    Announcement, AnnouncementPatch, AuditLog, ChatMessage, GalleryItem, NewAnnouncement,
    NewAuditLog, NewChatMessage, NewGalleryItem, Profile, ProfilePatch, Record, Role, Session,
    SessionKind, UserRole,
};
pub use requests::{IncrRequest, PatternRequest, SetRequest};
pub use responses::{
    DeletePatternResponse, DeleteResponse, ErrorResponse, ExistsResponse, FlushResponse,
    GetResponse, HealthResponse, IncrResponse, SetResponse, StatsResponse, TtlResponse,
};
