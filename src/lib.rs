//! PacketCrypt Supervisor - local control plane for a PacketCrypt miner
//!
//! This crate supervises a long-running external mining process and
//! republishes its state to interested observers. It provides:
//! - Process lifecycle control (start/stop, crash detection)
//! - Metric extraction from the miner's unstructured text output
//! - A consistent, concurrently readable status snapshot
//! - An HTTP command surface and a WebSocket status feed

#![warn(missing_docs)]

/// Process supervision: owns the miner handle and its lifecycle
pub mod supervisor;

/// Metric extraction from raw miner output
pub mod extract;

/// Current-status storage behind a serialization boundary
pub mod status;

/// Status distribution to subscribed observers
pub mod broadcast;

/// External-facing command surface (HTTP)
pub mod gateway;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use broadcast::{Broadcaster, run_feed_listener};
pub use cli::Commands;
pub use config::Config;
pub use extract::{MetricEvent, extract};
pub use gateway::{Gateway, router};
pub use status::StatusStore;
pub use supervisor::Supervisor;
pub use types::{MiningRequest, MiningStatus};
pub use utils::{SupervisorError, init_logging};
