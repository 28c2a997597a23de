// src/utils/error.rs
use serde_json;
use std::io;
use thiserror::Error;
use tokio_tungstenite::tungstenite;
use url;

/// Main error type for the supervisor application
///
/// This enum represents all possible error conditions that can occur while
/// supervising the miner, including state-precondition violations, input
/// validation failures, process launch failures, and transport errors.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// A start (or pool change) was requested while a miner is running
    #[error("mining is already running")]
    AlreadyRunning,

    /// A stop was requested while no miner is running
    #[error("mining is not running")]
    NotRunning,

    /// Missing or malformed input in a caller request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A pool URL that failed validation
    #[error("invalid pool URL: {0}")]
    InvalidPool(String),

    /// The miner binary could not be spawned
    #[error("failed to launch miner: {0}")]
    LaunchFailure(String),

    /// Configuration file or parameter errors
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// WebSocket communication errors
    #[error("WebSocket error: {0}")]
    WsError(#[from] tungstenite::Error),
}

impl SupervisorError {
    /// Whether this error is a caller mistake (bad input or a state
    /// precondition) rather than a supervisor-side failure
    ///
    /// The gateway uses this to pick between a 400 and a 500 response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SupervisorError::AlreadyRunning
                | SupervisorError::NotRunning
                | SupervisorError::InvalidRequest(_)
                | SupervisorError::InvalidPool(_)
        )
    }
}
