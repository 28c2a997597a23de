// src/extract/parser.rs
//! Miner output scraping
//!
//! The PacketCrypt binary reports progress as free-form text. This module
//! turns one chunk of that text into metric events without touching any
//! shared state, so the heuristics can evolve (and be tested) in isolation
//! from the process-lifecycle logic.
//!
//! Matching is chunk-based: a line split across two read chunks may be
//! missed. This mirrors the behavior of the original integration and is the
//! accepted inaccuracy of a best-effort scraper.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A number followed by an H/s, kH/s or MH/s unit token
    static ref HASHRATE_RE: Regex =
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(k|m)?h/s").expect("hashrate pattern is valid");
}

/// Words that indicate the miner is reporting a problem
const WARNING_WORDS: [&str; 3] = ["error", "failed", "connection"];

/// A single metric extracted from a chunk of miner output
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    /// A hashrate reading, normalized to H/s
    Hashrate(f64),
    /// The pool accepted a share (counted once per chunk)
    ShareAccepted,
    /// A diagnostic signal; logged by the caller, never fatal
    Warning(String),
}

/// Extracts metric events from one chunk of raw miner output
///
/// Recognized patterns:
/// - `<number> [k|M]H/s` (case-insensitive) yields one [`MetricEvent::Hashrate`]
///   per match, normalized to H/s.
/// - co-occurrence of "accepted" and "share" (case-insensitive, any order)
///   yields exactly one [`MetricEvent::ShareAccepted`] per chunk, however
///   many accepted-share lines the chunk holds.
/// - any of "error", "failed" or "connection" yields one
///   [`MetricEvent::Warning`] carrying the chunk text.
///
/// Unmatched text produces no events and is not an error.
pub fn extract(chunk: &str) -> Vec<MetricEvent> {
    let mut events = Vec::new();

    for caps in HASHRATE_RE.captures_iter(chunk) {
        if let Ok(value) = caps[1].parse::<f64>() {
            let scale = match caps.get(2).map(|unit| unit.as_str()) {
                Some("k") | Some("K") => 1_000.0,
                Some("m") | Some("M") => 1_000_000.0,
                _ => 1.0,
            };
            events.push(MetricEvent::Hashrate(value * scale));
        }
    }

    let lower = chunk.to_ascii_lowercase();
    if lower.contains("accepted") && lower.contains("share") {
        events.push(MetricEvent::ShareAccepted);
    }

    if WARNING_WORDS.iter().any(|word| lower.contains(word)) {
        events.push(MetricEvent::Warning(chunk.trim().to_string()));
    }

    events
}
