// src/supervisor/mod.rs
//! Process supervision
//!
//! This module owns the external miner process: spawning it with arguments
//! derived from a start request, terminating it gracefully, streaming its
//! output into the status store, and reacting to unexpected exits.

/// The supervisor implementation
///
/// Contains [`Supervisor`], the single owner of the miner process handle,
/// plus its output-drain and exit-watcher tasks.
pub mod process;

// Re-export main components for cleaner imports
pub use process::Supervisor;
