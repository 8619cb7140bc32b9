// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compressed snapshots of the materialized state.
//!
//! A snapshot records the full state together with the WAL sequence it
//! covers; recovery loads it and replays only later entries. Files are
//! zstd-compressed JSON tagged with a format version. This build reads
//! exactly [`SNAPSHOT_VERSION`] and refuses anything else.

use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Snapshot format written and accepted by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot has no format version")]
    MissingVersion,
    #[error("snapshot format {found} is not supported (this build reads {SNAPSHOT_VERSION})")]
    UnsupportedVersion { found: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    /// Last WAL sequence folded into `state`
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

/// Writes snapshots atomically: compress to `<path>.tmp`, fsync, rename.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn checkpoint_sync(
        &self,
        seq: u64,
        state: &MaterializedState,
    ) -> Result<CheckpointResult, SnapshotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let snapshot =
            Snapshot { version: SNAPSHOT_VERSION, seq, state: state.clone(), created_at: Utc::now() };
        let json = serde_json::to_vec(&snapshot)?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(CheckpointResult { seq, size_bytes: compressed.len() as u64 })
    }
}

/// Load the snapshot at `path`.
///
/// A missing file is `Ok(None)`. A file that fails to decompress, parse, or
/// carries a format other than [`SNAPSHOT_VERSION`] is an error, never an
/// empty state.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let json = zstd::decode_all(bytes.as_slice())?;
    let raw: serde_json::Value = serde_json::from_slice(&json)?;
    match raw.get("v").and_then(serde_json::Value::as_u64) {
        None => return Err(SnapshotError::MissingVersion),
        Some(v) if v != u64::from(SNAPSHOT_VERSION) => {
            return Err(SnapshotError::UnsupportedVersion { found: v })
        }
        Some(_) => {}
    }
    Ok(Some(serde_json::from_value(raw)?))
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
