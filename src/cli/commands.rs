// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// PacketCrypt Supervisor CLI - mining process supervision and status API
#[derive(Parser, Debug)]
#[command(name = "packetcrypt-supervisor")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (serve the API, check the binary, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the supervisor application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Run the supervisor and its HTTP/WebSocket surfaces
    Serve(ServeOptions),

    /// Probe the miner binary and print its version
    Check(CheckOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the supervisor
#[derive(Parser, Debug)]
pub struct ServeOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "supervisor.toml")]
    pub config: PathBuf,

    /// HTTP listen address (overrides config)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Path to the miner binary (overrides config)
    #[arg(short, long)]
    pub miner: Option<PathBuf>,
}

/// Options for probing the miner binary
#[derive(Parser, Debug)]
pub struct CheckOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "supervisor.toml")]
    pub config: PathBuf,

    /// Path to the miner binary (overrides config)
    #[arg(short, long)]
    pub miner: Option<PathBuf>,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "supervisor.toml")]
    pub output: PathBuf,
}
