// src/extract/mod.rs
//! Metric extraction from raw miner output
//!
//! The supervisor never speaks a structured protocol with the miner; it
//! scrapes the text the process prints. This module holds the pure
//! chunk-to-events parser that the output-drain task feeds.

/// The chunk parser and its event type
///
/// Contains [`extract`], a stateless function from one output chunk to a
/// finite list of [`MetricEvent`]s.
pub mod parser;

// Re-export main components for cleaner imports
pub use parser::{MetricEvent, extract};
