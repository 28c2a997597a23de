// src/broadcast/mod.rs
//! Status distribution to subscribed observers
//!
//! Two layers: the transport-agnostic [`Broadcaster`] keeping the observer
//! list and the push schedule, and the WebSocket listener that turns each
//! incoming connection into a registered observer.

/// Observer registry and periodic push loop
pub mod feed;

/// WebSocket listener for the status feed
///
/// Accepts subscriber connections and forwards snapshots as JSON text
/// frames.
pub mod ws;

// Re-export main components for cleaner imports
pub use feed::Broadcaster;
pub use ws::run_feed_listener;
