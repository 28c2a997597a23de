// src/config/config.rs
use crate::utils::error::SupervisorError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration structure for the supervisor
///
/// Contains all settings needed to run the supervisor: where the miner
/// binary lives, which pool to mine against when a start request names
/// none, and where the HTTP command surface and the WebSocket status feed
/// listen. Every field has a default so an empty file (or no file at all)
/// yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the PacketCrypt miner binary
    #[serde(default = "default_miner_path")]
    pub miner_path: PathBuf,

    /// Pool URL used when a start request does not name one
    #[serde(default = "default_pool")]
    pub default_pool: String,

    /// Address the HTTP command surface listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Address the WebSocket status feed listens on
    #[serde(default = "default_feed_addr")]
    pub feed_addr: SocketAddr,

    /// Seconds between status pushes to feed subscribers
    #[serde(default = "default_broadcast_interval_secs")]
    pub broadcast_interval_secs: u64,

    /// Milliseconds between checks for an unexpected miner exit
    #[serde(default = "default_exit_poll_ms")]
    pub exit_poll_ms: u64,
}

fn default_miner_path() -> PathBuf {
    "./packetcrypt".into()
}

fn default_pool() -> String {
    "http://pool.pkt.world".into()
}

fn default_listen_addr() -> SocketAddr {
    ([127, 0, 0, 1], 3001).into()
}

fn default_feed_addr() -> SocketAddr {
    ([127, 0, 0, 1], 3002).into()
}

fn default_broadcast_interval_secs() -> u64 {
    2
}

fn default_exit_poll_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Config {
            miner_path: default_miner_path(),
            default_pool: default_pool(),
            listen_addr: default_listen_addr(),
            feed_addr: default_feed_addr(),
            broadcast_interval_secs: default_broadcast_interval_secs(),
            exit_poll_ms: default_exit_poll_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(SupervisorError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SupervisorError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            SupervisorError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&config_str)
            .map_err(|e| SupervisorError::ConfigError(format!("Invalid config format: {}", e)))
    }

    /// Loads configuration from a file, falling back to defaults when the
    /// file does not exist
    ///
    /// A missing file is expected on first run; a present-but-broken file
    /// is still an error.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Result<Self, SupervisorError> {
        let path = path.into();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!(
                "No config file at {}, using built-in defaults",
                path.display()
            );
            Ok(Config::default())
        }
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# PacketCrypt Supervisor Configuration\n\n");
        template.push_str("# Path to the PacketCrypt miner binary\n");
        template.push_str("miner_path = \"./packetcrypt\"\n\n");
        template.push_str("# Pool used when a start request does not name one\n");
        template.push_str("default_pool = \"http://pool.pkt.world\"\n\n");
        template.push_str("# HTTP command surface\n");
        template.push_str("listen_addr = \"127.0.0.1:3001\"\n\n");
        template.push_str("# WebSocket status feed\n");
        template.push_str("feed_addr = \"127.0.0.1:3002\"\n\n");
        template.push_str("# Seconds between status pushes to subscribers\n");
        template.push_str("broadcast_interval_secs = 2\n\n");
        template.push_str("# Milliseconds between miner exit checks\n");
        template.push_str("exit_poll_ms = 500\n");
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An empty TOML document must deserialize to the built-in defaults.
    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.default_pool, "http://pool.pkt.world");
        assert_eq!(config.broadcast_interval_secs, 2);
        assert_eq!(config.listen_addr, ([127, 0, 0, 1], 3001).into());
    }

    /// The generated template must parse back into a valid configuration.
    #[test]
    fn test_template_round_trips() {
        let template = Config::generate_template();
        let config: Config = toml::from_str(&template).unwrap();
        assert_eq!(config.miner_path, PathBuf::from("./packetcrypt"));
        assert_eq!(config.exit_poll_ms, 500);
    }

    /// Partial files override only the fields they name.
    #[test]
    fn test_partial_config_overrides() {
        let config: Config =
            toml::from_str("default_pool = \"http://pool.example.org\"\n").unwrap();
        assert_eq!(config.default_pool, "http://pool.example.org");
        assert_eq!(config.feed_addr, ([127, 0, 0, 1], 3002).into());
    }
}
