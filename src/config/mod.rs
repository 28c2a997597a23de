// src/config/mod.rs
//! Configuration management for the supervisor
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing configuration files
//! - Generating configuration templates
//! - Default values for every setting
//!
//! The configuration uses TOML format; every field has a sensible default
//! so the supervisor can run without any file at all.

/// Core configuration implementation
///
/// Contains the [`Config`] struct that defines the supervisor's
/// configuration structure and behavior.
pub mod config;

// Re-export key items for easy access
pub use config::Config;

use crate::utils::error::SupervisorError;
use std::path::PathBuf;

/// Loads supervisor configuration from a TOML file, using defaults when
/// the file does not exist
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded (or defaulted) configuration
/// * `Err(SupervisorError)` - If the file exists but couldn't be parsed
pub fn load(path: impl Into<PathBuf>) -> Result<Config, SupervisorError> {
    Config::load_or_default(path)
}

/// Generates a commented configuration template
///
/// # Returns
/// String containing a ready-to-use TOML configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
