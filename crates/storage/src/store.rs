// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable job store with conditional commits.

use crate::checkpoint::{load_snapshot, CheckpointResult, Checkpointer, SnapshotError};
use crate::state::{Conflict, MaterializedState};
use crate::wal::{Wal, WalError};
use onejob_core::Event;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// WAL entries between automatic snapshots; zero disables them.
    pub checkpoint_every: u64,
}

/// Result of a conditional commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// Event is durable and applied.
    Applied { seq: u64 },
    /// Precondition failed; nothing was written.
    Rejected(Conflict),
}

impl Commit {
    pub fn is_applied(&self) -> bool {
        matches!(self, Commit::Applied { .. })
    }
}

struct Inner {
    state: MaterializedState,
    persist: Option<Persistence>,
}

struct Persistence {
    wal: Wal,
    checkpointer: Checkpointer,
    checkpoint_every: u64,
    since_checkpoint: u64,
}

/// Shared handle to the job table and execution slot.
///
/// Clones refer to the same store. All writes go through [`JobStore::commit`].
#[derive(Clone)]
pub struct JobStore {
    inner: Arc<Mutex<Inner>>,
}

impl JobStore {
    /// Volatile store without a WAL.
    pub fn in_memory() -> Self {
        Self::from_parts(MaterializedState::default(), None)
    }

    /// Recover from the latest snapshot plus WAL replay.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let (mut state, snapshot_seq) = match load_snapshot(&config.snapshot_path)? {
            Some(snapshot) => {
                info!(seq = snapshot.seq, jobs = snapshot.state.jobs.len(), "loaded snapshot");
                (snapshot.state, snapshot.seq)
            }
            None => {
                info!("no snapshot found, starting with empty state");
                (MaterializedState::default(), 0)
            }
        };

        let wal = Wal::open(&config.wal_path, snapshot_seq)?;
        let replay = wal.entries_after(snapshot_seq)?;
        let replayed = replay.len();
        for entry in replay {
            state.apply_event(&entry.event);
        }
        if replayed > 0 {
            info!(replayed, after_seq = snapshot_seq, "replayed WAL entries");
        }
        info!(
            jobs = state.jobs.len(),
            queued = state.queue_len(),
            slot = ?state.slot,
            "recovered job store"
        );

        let persist = Persistence {
            wal,
            checkpointer: Checkpointer::new(config.snapshot_path.clone()),
            checkpoint_every: config.checkpoint_every,
            since_checkpoint: replayed as u64,
        };
        Ok(Self::from_parts(state, Some(persist)))
    }

    fn from_parts(state: MaterializedState, persist: Option<Persistence>) -> Self {
        Self { inner: Arc::new(Mutex::new(Inner { state, persist })) }
    }

    /// Atomically check, persist and apply one event.
    ///
    /// The precondition check and the write happen under one lock, so two
    /// callers racing to admit a job cannot both succeed. A rejected event
    /// is not written. A WAL failure leaves state untouched.
    pub fn commit(&self, event: Event) -> Result<Commit, StoreError> {
        let mut inner = self.inner.lock();
        if let Err(conflict) = inner.state.check(&event) {
            debug!(event = event.name(), job_id = %event.job_id(), %conflict, "commit rejected");
            return Ok(Commit::Rejected(conflict));
        }

        let seq = match inner.persist.as_mut() {
            Some(persist) => {
                let before = persist.wal.write_seq();
                let seq = persist.wal.append(&event)?;
                if let Err(e) = persist.wal.flush() {
                    error!(error = %e, event = event.name(), "WAL flush failed");
                    persist.wal.discard_unflushed(before);
                    return Err(e.into());
                }
                seq
            }
            None => 0,
        };

        inner.state.apply_event(&event);
        debug!(seq, "{}", event.log_summary());

        let Inner { state, persist } = &mut *inner;
        if let Some(persist) = persist.as_mut() {
            persist.since_checkpoint += 1;
            if persist.checkpoint_every > 0 && persist.since_checkpoint >= persist.checkpoint_every
            {
                if let Err(e) = persist.checkpoint(state) {
                    warn!(error = %e, "periodic checkpoint failed");
                }
            }
        }
        Ok(Commit::Applied { seq })
    }

    /// Write a snapshot now and truncate the WAL it covers.
    pub fn checkpoint(&self) -> Result<Option<CheckpointResult>, StoreError> {
        let mut inner = self.inner.lock();
        let Inner { state, persist } = &mut *inner;
        match persist.as_mut() {
            Some(persist) => persist.checkpoint(state).map(Some),
            None => Ok(None),
        }
    }

    /// Run `f` against a consistent view of the state.
    pub fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R {
        f(&self.inner.lock().state)
    }

    pub fn get_job(&self, id: &str) -> Option<onejob_core::Job> {
        self.read(|s| s.get_job(id).cloned())
    }
}

impl Persistence {
    fn checkpoint(&mut self, state: &MaterializedState) -> Result<CheckpointResult, StoreError> {
        let seq = self.wal.write_seq();
        let result = self.checkpointer.checkpoint_sync(seq, state)?;
        self.wal.truncate_before(seq + 1)?;
        self.since_checkpoint = 0;
        info!(seq = result.seq, size_bytes = result.size_bytes, "saved snapshot");
        Ok(result)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
