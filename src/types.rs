// src/types.rs
use serde::{Deserialize, Serialize};

/// Aggregated status of the supervised mining process
///
/// This is the single record the whole supervisor revolves around. It is
/// owned by the [`StatusStore`](crate::status::StatusStore) and mutated only
/// by the process supervisor and the output-drain path; everything else
/// reads value copies.
///
/// Serialized with camelCase field names to match the wire format the
/// extension clients consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStatus {
    /// Whether a miner process handle is currently held
    pub is_running: bool,
    /// Last observed hashrate, normalized to H/s
    pub hashrate: f64,
    /// Accepted shares counted during the current run
    pub shares: u64,
    /// Pool URL the current (or last) run was started against
    pub pool: Option<String>,
    /// Wallet address the current (or last) run mines toward
    pub wallet: Option<String>,
    /// Unix timestamp (seconds) at which the current run started
    pub start_time: Option<u64>,
}

impl Default for MiningStatus {
    fn default() -> Self {
        MiningStatus {
            is_running: false,
            hashrate: 0.0,
            shares: 0,
            pool: None,
            wallet: None,
            start_time: None,
        }
    }
}

/// Parameters for starting a mining run
///
/// Constructed per start request and never persisted. `wallet` is required
/// and must be non-empty; `pool` falls back to the configured default pool
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningRequest {
    /// Payment address the miner submits work for
    pub wallet: String,
    /// Pool URL override for this run
    #[serde(default)]
    pub pool: Option<String>,
    /// Number of miner threads (default: 1)
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The status record must serialize with the camelCase names the
    /// extension clients expect.
    #[test]
    fn test_status_serializes_camel_case() {
        let status = MiningStatus {
            is_running: true,
            hashrate: 1500.0,
            shares: 3,
            pool: Some("http://pool.pkt.world".to_string()),
            wallet: Some("pkt1qexample".to_string()),
            start_time: Some(1_700_000_000),
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["isRunning"], true);
        assert_eq!(json["startTime"], 1_700_000_000u64);
        assert_eq!(json["shares"], 3);
    }

    /// A start request without `threads` defaults to a single thread.
    #[test]
    fn test_request_threads_default() {
        let request: MiningRequest =
            serde_json::from_str(r#"{"wallet": "pkt1qexample"}"#).unwrap();
        assert_eq!(request.threads, 1);
        assert!(request.pool.is_none());
    }
}
