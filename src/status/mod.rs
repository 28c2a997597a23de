// src/status/mod.rs
//! Current-status storage
//!
//! Houses the single shared [`MiningStatus`](crate::types::MiningStatus)
//! record behind an explicit serialization boundary. All components read
//! and mutate the status exclusively through [`StatusStore`].

/// The store implementation
///
/// Serializes writers through a mutex and publishes committed snapshots
/// atomically for lock-free readers.
pub mod store;

// Re-export main components for cleaner imports
pub use store::StatusStore;
