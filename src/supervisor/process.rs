// src/supervisor/process.rs
//! Miner process lifecycle management
//!
//! Owns the one-and-only handle to the external PacketCrypt process:
//! starts it, stops it, drains its output through the metric extractor
//! into the status store, and watches for unexpected exits so that a
//! crashed miner can never leave a stale "running" status behind.

use crate::extract::{MetricEvent, extract};
use crate::status::StatusStore;
use crate::types::{MiningRequest, MiningStatus};
use crate::utils::error::SupervisorError;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock};

/// Supervises the external miner process
///
/// At most one process handle exists at a time; the handle lock makes
/// `start` and `stop` mutually exclusive with themselves and each other.
/// The invariant maintained across every exit path, including crashes, is:
/// the store reports `is_running == true` if and only if a handle is held.
pub struct Supervisor {
    inner: Arc<SupervisorInner>,
}

struct SupervisorInner {
    /// The one process handle; `Some` exactly while a run is active
    handle: Mutex<Option<Child>>,
    /// Shared status record that start/stop/drain mutate
    store: Arc<StatusStore>,
    /// Path to the PacketCrypt binary
    miner_path: PathBuf,
    /// Pool applied when a start request names none
    default_pool: RwLock<String>,
    /// How often the exit watcher checks for a terminated miner
    exit_poll: Duration,
    /// Run counter; bumped on every start and stop so a drain task can
    /// tell that the run it belongs to is over and its output is stale
    generation: AtomicU64,
}

impl Supervisor {
    /// Creates a new Supervisor
    ///
    /// # Arguments
    /// * `miner_path` - Path to the PacketCrypt binary
    /// * `default_pool` - Pool URL used when a request carries none
    /// * `exit_poll` - Interval at which unexpected exits are detected
    /// * `store` - Shared status store this supervisor mutates
    pub fn new(
        miner_path: PathBuf,
        default_pool: String,
        exit_poll: Duration,
        store: Arc<StatusStore>,
    ) -> Self {
        Supervisor {
            inner: Arc::new(SupervisorInner {
                handle: Mutex::new(None),
                store,
                miner_path,
                default_pool: RwLock::new(default_pool),
                exit_poll,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Starts the miner process
    ///
    /// Spawns the binary with arguments derived from `request`, resets the
    /// status store to a fresh running record, and launches the output
    /// drain and exit watcher tasks.
    ///
    /// # Errors
    /// * `InvalidRequest` - empty wallet or zero threads; nothing is spawned
    /// * `AlreadyRunning` - a handle already exists; no second process is
    ///   spawned
    /// * `LaunchFailure` - the binary could not be spawned; no handle is
    ///   retained
    pub async fn start(
        &self,
        request: MiningRequest,
    ) -> Result<MiningStatus, SupervisorError> {
        if request.wallet.trim().is_empty() {
            return Err(SupervisorError::InvalidRequest(
                "wallet address is required".to_string(),
            ));
        }
        if request.threads == 0 {
            return Err(SupervisorError::InvalidRequest(
                "threads must be at least 1".to_string(),
            ));
        }

        // Holding the handle lock across the spawn is what rules out two
        // concurrent starts both succeeding.
        let mut handle = self.inner.handle.lock().await;
        if handle.is_some() {
            return Err(SupervisorError::AlreadyRunning);
        }

        let pool = match request.pool.clone() {
            Some(pool) => pool,
            None => self.inner.default_pool.read().await.clone(),
        };

        let mut child = Command::new(&self.inner.miner_path)
            .arg("ann")
            .arg("-p")
            .arg(&pool)
            .arg("-P")
            .arg(&request.wallet)
            .arg("--threads")
            .arg(request.threads.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SupervisorError::LaunchFailure(format!(
                    "{}: {}",
                    self.inner.miner_path.display(),
                    e
                ))
            })?;

        log::info!(
            "Started miner (pid {:?}) against {} for wallet {}",
            child.id(),
            pool,
            request.wallet
        );

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let status = MiningStatus {
            is_running: true,
            hashrate: 0.0,
            shares: 0,
            pool: Some(pool),
            wallet: Some(request.wallet),
            start_time: Some(unix_now()),
        };
        self.inner.store.reset(status.clone());
        *handle = Some(child);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(handle);

        if let Some(stdout) = stdout {
            tokio::spawn(drain_stdout(stdout, Arc::clone(&self.inner), generation));
        }
        if let Some(stderr) = stderr {
            tokio::spawn(drain_stderr(stderr));
        }
        tokio::spawn(watch_exit(Arc::clone(&self.inner)));

        Ok(status)
    }

    /// Stops the miner process gracefully
    ///
    /// Sends SIGTERM, discards the handle and marks the store stopped
    /// immediately; the process is reaped in the background, so the caller
    /// never blocks on the actual exit.
    ///
    /// # Errors
    /// * `NotRunning` - no handle exists; the store is left untouched
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let mut handle = self.inner.handle.lock().await;
        let mut child = handle.take().ok_or(SupervisorError::NotRunning)?;
        // Commit the not-running transition and invalidate the old run's
        // drain while the handle lock is still held; a concurrent start
        // that wins the lock next must find the store already stopped,
        // never the other way around.
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.store.mark_stopped();
        drop(handle);

        match child.id() {
            Some(pid) => {
                // Graceful shutdown; the miner contract promises a clean
                // exit on SIGTERM within its grace period.
                #[allow(unsafe_code)]
                unsafe {
                    libc::kill(pid as libc::pid_t, libc::SIGTERM);
                }
            }
            None => {
                // Already exited; nothing to signal.
                let _ = child.start_kill();
            }
        }

        log::info!("Stopping miner");

        // Reap in the background so the kernel frees the process entry.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(exit) => log::info!("Miner exited with {}", exit),
                Err(e) => log::warn!("Failed to reap miner: {}", e),
            }
        });

        Ok(())
    }

    /// Whether a process handle is currently held
    pub async fn is_running(&self) -> bool {
        self.inner.handle.lock().await.is_some()
    }

    /// Replaces the default pool applied to future start requests
    pub async fn set_default_pool(&self, pool: String) {
        *self.inner.default_pool.write().await = pool;
    }

    /// Returns the default pool currently applied to start requests
    pub async fn default_pool(&self) -> String {
        self.inner.default_pool.read().await.clone()
    }

    /// Probes the miner binary by running it with `--version`
    ///
    /// # Returns
    /// * `Ok(String)` - The trimmed version string the binary printed
    /// * `Err(SupervisorError)` - If the binary is missing or not runnable
    pub async fn check_binary(&self) -> Result<String, SupervisorError> {
        let output = Command::new(&self.inner.miner_path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                SupervisorError::LaunchFailure(format!(
                    "{} not available: {}",
                    self.inner.miner_path.display(),
                    e
                ))
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Seconds since the unix epoch
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Drains miner stdout, feeding each chunk through the metric extractor
///
/// Runs until the pipe reaches EOF (i.e. the process exited) or the run
/// it was spawned for is over. A stopped process can still flush output
/// during its grace period; the generation check keeps those stale chunks
/// out of the store once a stop or a new start has superseded the run.
/// Parse failures on one chunk never abort the drain.
async fn drain_stdout(mut stdout: ChildStdout, inner: Arc<SupervisorInner>, generation: u64) {
    let mut buf = [0u8; 4096];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if inner.generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                let chunk = String::from_utf8_lossy(&buf[..n]);
                log::debug!("miner output: {}", chunk.trim_end());
                for event in extract(&chunk) {
                    match event {
                        MetricEvent::Hashrate(value) => inner.store.apply_hashrate(value),
                        MetricEvent::ShareAccepted => inner.store.apply_share(),
                        MetricEvent::Warning(text) => {
                            log::warn!("Miner reported a possible problem: {}", text)
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("Reading miner stdout failed: {}", e);
                break;
            }
        }
    }
}

/// Drains miner stderr into the log
async fn drain_stderr(mut stderr: ChildStderr) {
    let mut buf = [0u8; 4096];
    loop {
        match stderr.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]);
                log::warn!("miner stderr: {}", chunk.trim_end());
            }
            Err(_) => break,
        }
    }
}

/// Watches for the miner terminating without an explicit stop
///
/// Polls `try_wait` on an interval. When the child has exited (crash,
/// external kill, or graceful end), clears the handle and flips the store
/// to not-running, upholding the handle/`is_running` invariant. Ends as
/// soon as the handle is gone, whichever path cleared it.
async fn watch_exit(inner: Arc<SupervisorInner>) {
    let mut interval = tokio::time::interval(inner.exit_poll);
    loop {
        interval.tick().await;
        let mut handle = inner.handle.lock().await;
        match handle.as_mut() {
            // stop() (or a previous watcher pass) already cleared it
            None => break,
            Some(child) => match child.try_wait() {
                Ok(None) => {}
                Ok(Some(exit)) => {
                    log::warn!("Miner exited unexpectedly with {}", exit);
                    *handle = None;
                    inner.store.mark_stopped();
                    break;
                }
                Err(e) => {
                    log::warn!("Failed to poll miner exit status: {}", e);
                    *handle = None;
                    inner.store.mark_stopped();
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCRIPT_ID: AtomicUsize = AtomicUsize::new(0);

    /// Writes an executable shell script standing in for the miner binary.
    /// The script receives the usual `ann -p ... -P ...` arguments and may
    /// ignore them.
    fn fake_miner(body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = std::env::temp_dir().join(format!(
            "fake-packetcrypt-{}-{}.sh",
            std::process::id(),
            SCRIPT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn supervisor_for(script: PathBuf) -> (Supervisor, Arc<StatusStore>) {
        let store = Arc::new(StatusStore::new());
        let supervisor = Supervisor::new(
            script,
            "http://pool.pkt.world".to_string(),
            Duration::from_millis(50),
            Arc::clone(&store),
        );
        (supervisor, store)
    }

    fn request(wallet: &str) -> MiningRequest {
        MiningRequest {
            wallet: wallet.to_string(),
            pool: None,
            threads: 1,
        }
    }

    /// A well-formed start succeeds and the status immediately reports
    /// running, with the default pool filled in.
    #[tokio::test]
    async fn test_start_reports_running() {
        let script = fake_miner("sleep 30");
        let (supervisor, store) = supervisor_for(script.clone());

        let status = supervisor.start(request("pkt1qexample")).await.unwrap();
        assert!(status.is_running);
        assert_eq!(status.pool.as_deref(), Some("http://pool.pkt.world"));
        assert!(store.get().is_running);
        assert!(supervisor.is_running().await);

        supervisor.stop().await.unwrap();
        let _ = std::fs::remove_file(script);
    }

    /// A second start without an intervening stop fails with
    /// AlreadyRunning and spawns nothing.
    #[tokio::test]
    async fn test_second_start_rejected() {
        let script = fake_miner("sleep 30");
        let (supervisor, _store) = supervisor_for(script.clone());

        supervisor.start(request("pkt1qexample")).await.unwrap();
        let second = supervisor.start(request("pkt1qother")).await;
        assert!(matches!(second, Err(SupervisorError::AlreadyRunning)));

        // The original run is untouched.
        assert!(supervisor.is_running().await);
        supervisor.stop().await.unwrap();
        let _ = std::fs::remove_file(script);
    }

    /// Stopping a supervisor that is not running fails with NotRunning and
    /// leaves the store untouched.
    #[tokio::test]
    async fn test_stop_without_start() {
        let (supervisor, store) = supervisor_for(PathBuf::from("/nonexistent"));
        let before = store.get();

        let result = supervisor.stop().await;
        assert!(matches!(result, Err(SupervisorError::NotRunning)));
        assert_eq!(store.get(), before);
    }

    /// An empty wallet is rejected before anything is spawned.
    #[tokio::test]
    async fn test_empty_wallet_rejected() {
        let script = fake_miner("sleep 30");
        let (supervisor, store) = supervisor_for(script.clone());

        let result = supervisor.start(request("  ")).await;
        assert!(matches!(result, Err(SupervisorError::InvalidRequest(_))));
        assert!(!store.get().is_running);
        assert!(!supervisor.is_running().await);
        let _ = std::fs::remove_file(script);
    }

    /// A missing binary reports LaunchFailure and retains no handle.
    #[tokio::test]
    async fn test_missing_binary_is_launch_failure() {
        let (supervisor, store) =
            supervisor_for(PathBuf::from("/nonexistent/packetcrypt"));

        let result = supervisor.start(request("pkt1qexample")).await;
        assert!(matches!(result, Err(SupervisorError::LaunchFailure(_))));
        assert!(!store.get().is_running);
        assert!(!supervisor.is_running().await);
    }

    /// When the miner exits on its own, the exit watcher flips the status
    /// to not-running within a poll interval or two.
    #[tokio::test]
    async fn test_unexpected_exit_clears_running() {
        let script = fake_miner("exit 1");
        let (supervisor, store) = supervisor_for(script.clone());

        supervisor.start(request("pkt1qexample")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(!store.get().is_running);
        assert!(!supervisor.is_running().await);

        // And the slot is free for the next run.
        supervisor.start(request("pkt1qexample")).await.unwrap();
        let _ = std::fs::remove_file(script);
    }

    /// Miner output flows through the extractor into the store.
    #[tokio::test]
    async fn test_output_updates_metrics() {
        let script = fake_miner(
            "echo 'rate: 12.50 MH/s'; echo 'share accepted by pool'; sleep 30",
        );
        let (supervisor, store) = supervisor_for(script.clone());

        supervisor.start(request("pkt1qexample")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let status = store.get();
        assert_eq!(status.hashrate, 12_500_000.0);
        assert_eq!(status.shares, 1);

        supervisor.stop().await.unwrap();
        let _ = std::fs::remove_file(script);
    }

    /// stop() commits the not-running transition while it still holds the
    /// handle lock, so a start racing it can never be overwritten by the
    /// tail of a stale stop. Hammer the pair on a multi-threaded runtime
    /// and check the handle/`is_running` iff-invariant at every quiescent
    /// point.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stop_and_start_keep_invariant() {
        let script = fake_miner("sleep 30");
        let (supervisor, store) = supervisor_for(script.clone());
        let supervisor = Arc::new(supervisor);

        for _ in 0..10 {
            let _ = supervisor.start(request("pkt1qexample")).await;

            let stopper = {
                let supervisor = Arc::clone(&supervisor);
                tokio::spawn(async move { supervisor.stop().await })
            };
            let starter = {
                let supervisor = Arc::clone(&supervisor);
                tokio::spawn(async move { supervisor.start(request("pkt1qother")).await })
            };
            let _ = stopper.await;
            let _ = starter.await;

            // Whatever order the pair ran in, the store and the handle
            // must agree.
            assert_eq!(store.get().is_running, supervisor.is_running().await);

            if supervisor.is_running().await {
                supervisor.stop().await.unwrap();
            }
        }
        let _ = std::fs::remove_file(script);
    }

    /// Output the old process flushes after stop (here its shutdown trap
    /// firing during the grace period) must not bleed into the store.
    #[tokio::test]
    async fn test_stale_output_after_stop_is_discarded() {
        let script = fake_miner(
            "trap 'echo late: 999 MH/s; exit 0' TERM\necho 'rate: 100 H/s'\nsleep 30 &\nwait",
        );
        let (supervisor, store) = supervisor_for(script.clone());

        supervisor.start(request("pkt1qexample")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.get().hashrate, 100.0);

        supervisor.stop().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        let status = store.get();
        assert!(!status.is_running);
        assert_eq!(status.hashrate, 100.0);
        let _ = std::fs::remove_file(script);
    }

    /// After stop, a new run starts from zeroed metrics.
    #[tokio::test]
    async fn test_restart_resets_counters() {
        let script = fake_miner("echo 'accepted share'; sleep 30");
        let (supervisor, store) = supervisor_for(script.clone());

        supervisor.start(request("pkt1qexample")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.get().shares, 1);
        supervisor.stop().await.unwrap();

        // The watcher needs a beat to observe the cleared handle.
        tokio::time::sleep(Duration::from_millis(150)).await;

        let status = supervisor.start(request("pkt1qexample")).await.unwrap();
        assert_eq!(status.shares, 0);
        supervisor.stop().await.unwrap();
        let _ = std::fs::remove_file(script);
    }
}
