// src/broadcast/feed.rs
//! Periodic status broadcasting
//!
//! Keeps a list of observer handles and pushes the current status snapshot
//! to every one of them on a fixed interval, plus an immediate snapshot
//! the moment an observer registers. Delivery is best-effort: an observer
//! whose channel is gone is dropped from the list and never blocks the
//! others.

use crate::status::StatusStore;
use crate::types::MiningStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// Pushes status snapshots to all registered observers
///
/// The broadcaster holds only the sender half of each observer's channel;
/// the transport task owns the receiver, so dropping the connection
/// deregisters the observer on the next push.
pub struct Broadcaster {
    /// Source of the snapshots being pushed
    store: Arc<StatusStore>,
    /// Sender halves of every registered observer
    subscribers: Mutex<Vec<UnboundedSender<MiningStatus>>>,
    /// Time between pushes
    interval: Duration,
}

impl Broadcaster {
    /// Creates a new Broadcaster
    ///
    /// # Arguments
    /// * `store` - Status store the snapshots are read from
    /// * `interval` - Time between periodic pushes
    pub fn new(store: Arc<StatusStore>, interval: Duration) -> Self {
        Broadcaster {
            store,
            subscribers: Mutex::new(Vec::new()),
            interval,
        }
    }

    /// Registers a new observer
    ///
    /// The observer receives one immediate snapshot and then the periodic
    /// ones until its receiver is dropped.
    pub async fn subscribe(&self) -> UnboundedReceiver<MiningStatus> {
        let (tx, rx) = unbounded_channel();
        // Initial snapshot lands before the sender joins the list, so the
        // observer always sees the current state right away.
        let _ = tx.send(self.store.get());
        self.subscribers.lock().await.push(tx);
        rx
    }

    /// Number of currently registered observers
    pub async fn observer_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Pushes one snapshot to every registered observer
    ///
    /// Observers whose channel is closed are dropped from the list; a
    /// failed delivery never affects the remaining observers. Does nothing
    /// when nobody is registered.
    pub async fn broadcast_once(&self) {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.is_empty() {
            return;
        }
        let snapshot = self.store.get();
        subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    /// Spawns the periodic broadcast loop
    pub fn run(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            loop {
                interval.tick().await;
                self.broadcast_once().await;
            }
        })
    }
}
