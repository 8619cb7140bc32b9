// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! onejob-storage: the durable job store.
//!
//! State is a materialized view over a write-ahead log of [`Event`]s,
//! periodically compacted into zstd snapshots. [`JobStore::commit`] is the
//! only write path: it validates an event against current state, appends it,
//! and applies it under one lock, which makes claiming the execution slot an
//! atomic compare-and-swap.
//!
//! [`Event`]: onejob_core::Event

mod checkpoint;
mod state;
mod store;
mod wal;

pub use checkpoint::{
    load_snapshot, CheckpointResult, Checkpointer, Snapshot, SnapshotError, SNAPSHOT_VERSION,
};
pub use state::{Conflict, MaterializedState};
pub use store::{Commit, JobStore, StoreConfig, StoreError};
pub use wal::{Wal, WalEntry, WalError};
