//! Cache Service API
//!
//! The HTTP face of the in-process cache, spoken by [`crate::cache::HttpCache`].
//!
//! - `PUT /set`, `GET /get/:key`, `DELETE /del/:key`
//! - `POST /del-pattern`, `GET /exists/:key`, `POST /incr`, `GET /ttl/:key`
//! - `POST /flush` (requires `x-admin-token`)
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
