// src/gateway/api.rs
//! Command surface operations
//!
//! The transport-agnostic side of the gateway: validates input, delegates
//! to the supervisor and the status store, and returns structured results.
//! Nothing here panics past the boundary; every operation yields a
//! `Result` the transport layer turns into an envelope.

use crate::status::StatusStore;
use crate::supervisor::Supervisor;
use crate::types::{MiningRequest, MiningStatus};
use crate::utils::error::SupervisorError;
use serde::Serialize;
use std::sync::Arc;
use sysinfo::System;
use url::Url;

/// Host machine facts reported by the system endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Operating system name
    pub platform: String,
    /// Number of logical CPUs
    pub cpus: usize,
    /// Total memory, rounded to whole gigabytes
    pub memory: String,
    /// Seconds since the host booted
    pub uptime: u64,
}

/// The external-facing command surface
///
/// One instance is shared across all transport handlers; it never mutates
/// the status record directly, only through the supervisor.
#[derive(Clone)]
pub struct Gateway {
    supervisor: Arc<Supervisor>,
    store: Arc<StatusStore>,
}

impl Gateway {
    /// Creates a gateway over the given supervisor and store
    pub fn new(supervisor: Arc<Supervisor>, store: Arc<StatusStore>) -> Self {
        Gateway { supervisor, store }
    }

    /// Returns the current status snapshot
    pub fn status(&self) -> MiningStatus {
        self.store.get()
    }

    /// Starts a mining run
    ///
    /// # Errors
    /// Propagates the supervisor's `InvalidRequest`, `AlreadyRunning` and
    /// `LaunchFailure` results unchanged.
    pub async fn start(
        &self,
        request: MiningRequest,
    ) -> Result<MiningStatus, SupervisorError> {
        self.supervisor.start(request).await
    }

    /// Stops the current mining run
    ///
    /// # Errors
    /// `NotRunning` when no run is active.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        self.supervisor.stop().await
    }

    /// Replaces the default pool used by future starts
    ///
    /// # Errors
    /// * `AlreadyRunning` - pool changes are forbidden mid-run
    /// * `InvalidPool` - the URL is malformed or not http(s)
    pub async fn set_pool(&self, pool: &str) -> Result<String, SupervisorError> {
        if self.store.get().is_running {
            return Err(SupervisorError::AlreadyRunning);
        }

        let url = Url::parse(pool)
            .map_err(|e| SupervisorError::InvalidPool(format!("{}: {}", pool, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SupervisorError::InvalidPool(format!(
                "{}: expected an http(s) URL",
                pool
            )));
        }

        self.supervisor.set_default_pool(pool.to_string()).await;
        log::info!("Default pool set to {}", pool);
        Ok(pool.to_string())
    }

    /// Probes the miner binary version
    ///
    /// # Errors
    /// `LaunchFailure` when the binary is missing or not runnable.
    pub async fn check(&self) -> Result<String, SupervisorError> {
        self.supervisor.check_binary().await
    }

    /// Collects host machine facts for the system endpoint
    pub fn system_info(&self) -> SystemInfo {
        let system = System::new_all();
        let gigabytes =
            (system.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0)).round() as u64;

        SystemInfo {
            platform: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            cpus: system.cpus().len(),
            memory: format!("{} GB", gigabytes),
            uptime: System::uptime(),
        }
    }
}
