//! Error types for the cache layer and the backing store
//!
//! Provides unified error handling using thiserror. Cache errors are never
//! surfaced to data-layer consumers; store errors always are.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Error type for the cache engine, its transports and the cache service API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// INCR on a value that does not hold an integer
    #[error("Value at '{0}' is not an integer")]
    NotAnInteger(String),

    /// Administrative operation attempted without authorization
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Transport could not reach the cache service
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// Cache service answered with an unexpected status or body
    #[error("Cache command error: {0}")]
    Command(String),

    /// Payload could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::Expired(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::NotAnInteger(_) => StatusCode::CONFLICT,
            CacheError::Forbidden(_) => StatusCode::FORBIDDEN,
            CacheError::CacheFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Connection(_) => StatusCode::BAD_GATEWAY,
            CacheError::Command(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Store Error Enum ==
/// Errors raised by a backing store. Accessors propagate these unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row with this id exists in the table
    #[error("{table} record '{id}' not found")]
    NotFound { table: String, id: String },

    /// Record rejected by the store's validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unique or referential constraint violated
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Store unreachable or refused the call
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Row returned by the store does not match the expected record shape
    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// Result type for backing store and accessor operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
