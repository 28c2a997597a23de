// src/main.rs
use clap::Parser;
use packetcrypt_supervisor::{
    Broadcaster, Config, Gateway, StatusStore, Supervisor, SupervisorError, cli, config,
    router, run_feed_listener, utils,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Main entry point for the PacketCrypt supervisor
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(SupervisorError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), SupervisorError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Serve(opts) => serve(opts),
        cli::Action::Check(opts) => check(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Runs the supervisor with its HTTP and WebSocket surfaces
///
/// # Arguments
/// * `opts` - Command line options for the serve operation
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Wires store, supervisor, broadcaster and gateway together
/// 4. Serves until ctrl-c, stopping a running miner on the way out
fn serve(opts: cli::ServeOptions) -> Result<(), SupervisorError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    // Apply CLI overrides
    if let Some(listen) = opts.listen {
        config.listen_addr = listen;
    }
    if let Some(miner) = opts.miner {
        config.miner_path = miner;
    }

    let rt = Runtime::new()?;
    rt.block_on(run(config))
}

/// Async body of the serve command
async fn run(config: Config) -> Result<(), SupervisorError> {
    let store = Arc::new(StatusStore::new());
    let supervisor = Arc::new(Supervisor::new(
        config.miner_path.clone(),
        config.default_pool.clone(),
        Duration::from_millis(config.exit_poll_ms),
        Arc::clone(&store),
    ));

    // Periodic status feed
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::clone(&store),
        Duration::from_secs(config.broadcast_interval_secs),
    ));
    Arc::clone(&broadcaster).run();
    let feed_addr = config.feed_addr;
    let feed_broadcaster = Arc::clone(&broadcaster);
    tokio::spawn(async move {
        // A feed that cannot listen is a dead distribution surface; make
        // sure it dies loudly.
        if let Err(e) = run_feed_listener(feed_addr, feed_broadcaster).await {
            log::error!("Status feed listener failed: {}", e);
        }
    });

    // HTTP command surface
    let gateway = Gateway::new(Arc::clone(&supervisor), store);
    let app = router(gateway);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    log::info!("PacketCrypt supervisor API on http://{}", config.listen_addr);
    log::info!("  GET  /api/status      - mining status");
    log::info!("  POST /api/start       - start mining");
    log::info!("  POST /api/stop        - stop mining");
    log::info!("  POST /api/config/pool - set default pool");
    log::info!("  GET  /api/system      - system info");
    log::info!("  GET  /api/check       - probe miner binary");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown(supervisor))
        .await?;
    Ok(())
}

/// Waits for ctrl-c, then stops a running miner before the server exits
async fn shutdown(supervisor: Arc<Supervisor>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutting down");
    if supervisor.is_running().await {
        if let Err(e) = supervisor.stop().await {
            log::warn!("Failed to stop miner on shutdown: {}", e);
        }
    }
}

/// Probes the miner binary and prints its version
///
/// # Arguments
/// * `opts` - Check options (config path, binary override)
fn check(opts: cli::CheckOptions) -> Result<(), SupervisorError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    if let Some(miner) = opts.miner {
        config.miner_path = miner;
    }

    let store = Arc::new(StatusStore::new());
    let supervisor = Supervisor::new(
        config.miner_path,
        config.default_pool,
        Duration::from_millis(config.exit_poll_ms),
        store,
    );

    let rt = Runtime::new()?;
    let version = rt.block_on(supervisor.check_binary())?;
    log::info!("Miner binary available: {}", version);
    Ok(())
}

/// Generates configuration template file
///
/// # Arguments
/// * `opts` - Configuration generation options
///
/// # Operations
/// 1. Generates template content
/// 2. Writes template to specified output file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), SupervisorError> {
    let template = config::generate_template();
    std::fs::write(opts.output, template)?;
    Ok(())
}
