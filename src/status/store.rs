// src/status/store.rs
//! Shared mining status record
//!
//! One record, one writer-at-a-time. Mutations go through an internal
//! mutex holding the authoritative copy; every committed state is
//! published as a whole via an atomically swappable snapshot, so readers
//! are lock-free and can never observe a half-applied update.

use crate::types::MiningStatus;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};

/// Serialization boundary around the single [`MiningStatus`] record
///
/// [`get`](StatusStore::get) returns a value copy; the mutation methods
/// are each atomic with respect to readers and to one another.
pub struct StatusStore {
    /// Published snapshot, swapped atomically on every commit
    current: ArcSwap<MiningStatus>,
    /// Authoritative copy; taking this lock serializes all writers
    authoritative: Mutex<MiningStatus>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    /// Creates a store holding the idle status (not running, zero metrics)
    pub fn new() -> Self {
        let initial = MiningStatus::default();
        StatusStore {
            current: ArcSwap::from_pointee(initial.clone()),
            authoritative: Mutex::new(initial),
        }
    }

    /// Returns a copy of the current status snapshot
    ///
    /// Never blocks on writers beyond the cost of cloning the record.
    pub fn get(&self) -> MiningStatus {
        MiningStatus::clone(&self.current.load())
    }

    /// Replaces the whole record, starting a fresh run
    ///
    /// # Arguments
    /// * `status` - The new status; typically `is_running: true` with zeroed
    ///   metrics and a fresh start time
    pub fn reset(&self, status: MiningStatus) {
        self.update(|current| *current = status);
    }

    /// Records the latest hashrate reading (already normalized to H/s)
    pub fn apply_hashrate(&self, hashrate: f64) {
        self.update(|current| current.hashrate = hashrate);
    }

    /// Increments the accepted-share counter by exactly one
    pub fn apply_share(&self) {
        self.update(|current| current.shares += 1);
    }

    /// Marks the run stopped, leaving the last metrics readable
    pub fn mark_stopped(&self) {
        self.update(|current| current.is_running = false);
    }

    /// Applies one logical mutation and publishes the result as a whole
    fn update(&self, mutate: impl FnOnce(&mut MiningStatus)) {
        let mut guard = self
            .authoritative
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        mutate(&mut guard);
        self.current.store(Arc::new(guard.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_status() -> MiningStatus {
        MiningStatus {
            is_running: true,
            hashrate: 0.0,
            shares: 0,
            pool: Some("http://pool.pkt.world".to_string()),
            wallet: Some("pkt1qexample".to_string()),
            start_time: Some(1_700_000_000),
        }
    }

    /// A snapshot is a value copy, unaffected by later mutations.
    #[test]
    fn test_snapshot_is_a_copy() {
        let store = StatusStore::new();
        store.reset(running_status());

        let before = store.get();
        store.apply_hashrate(1_000.0);
        store.apply_share();

        assert_eq!(before.hashrate, 0.0);
        assert_eq!(before.shares, 0);
        let after = store.get();
        assert_eq!(after.hashrate, 1_000.0);
        assert_eq!(after.shares, 1);
    }

    /// Shares only ever grow within a run and reset on a new one.
    #[test]
    fn test_share_counter_resets_on_new_run() {
        let store = StatusStore::new();
        store.reset(running_status());
        store.apply_share();
        store.apply_share();
        assert_eq!(store.get().shares, 2);

        store.reset(running_status());
        assert_eq!(store.get().shares, 0);
    }

    /// Marking stopped only flips the flag; metrics stay readable.
    #[test]
    fn test_mark_stopped_keeps_metrics() {
        let store = StatusStore::new();
        store.reset(running_status());
        store.apply_hashrate(500.0);
        store.mark_stopped();

        let status = store.get();
        assert!(!status.is_running);
        assert_eq!(status.hashrate, 500.0);
        assert_eq!(status.wallet.as_deref(), Some("pkt1qexample"));
    }

    /// Concurrent readers and a writer never tear the record: each observed
    /// snapshot is internally consistent (shares never exceeds the writer's
    /// committed count, hashrate matches the same commit).
    #[test]
    fn test_concurrent_reads_see_whole_updates() {
        let store = Arc::new(StatusStore::new());
        store.reset(running_status());

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..1_000u64 {
                    store.update(|current| {
                        current.shares = i;
                        current.hashrate = i as f64;
                    });
                }
            })
        };

        for _ in 0..1_000 {
            let snapshot = store.get();
            assert_eq!(snapshot.shares as f64, snapshot.hashrate);
        }

        writer.join().unwrap();
    }
}
