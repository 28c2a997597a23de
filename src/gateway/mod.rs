// src/gateway/mod.rs
//! External-facing command surface
//!
//! Split in two: [`api`] holds the transport-agnostic operations
//! (validate, delegate, structured result) and [`routes`] the HTTP wiring
//! that exposes them. Only this module talks to callers; it never touches
//! the status record directly.

/// Transport-agnostic command operations
pub mod api;

/// HTTP routes over the command operations
pub mod routes;

// Re-export main components for cleaner imports
pub use api::{Gateway, SystemInfo};
pub use routes::router;
