// src/cli/mod.rs
//! Command-line interface definitions
//!
//! Clap derive structs for the supervisor's subcommands and their options.

/// Subcommand and option structs
pub mod commands;

// Re-export for easier access
pub use commands::{Action, CheckOptions, Commands, ConfigOptions, ServeOptions};
