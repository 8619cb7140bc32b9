// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of job events.
//!
//! One JSON object per line: `{"seq":N,"event":{...}}`. Sequence numbers
//! increase by one per entry and continue past truncation, so a snapshot's
//! `seq` always identifies where replay resumes.

use onejob_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

pub struct Wal {
    path: PathBuf,
    file: File,
    buffer: Vec<u8>,
    write_seq: u64,
}

impl Wal {
    /// Open or create the log at `path`.
    ///
    /// `floor_seq` is the sequence already covered by a snapshot; numbering
    /// continues from whichever is higher, it or the last entry on disk. A
    /// corrupt tail is moved aside to a `.bak` file and the valid prefix kept.
    pub fn open(path: &Path, floor_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut last_seq = 0;
        if path.exists() {
            let (entries, corrupt) = read_entries(path)?;
            if corrupt {
                let bak = set_aside(path)?;
                warn!(path = %path.display(), backup = %bak.display(), valid = entries.len(),
                    "corrupt WAL tail, keeping valid prefix");
                write_entries(path, &entries)?;
            }
            last_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            buffer: Vec::new(),
            write_seq: last_seq.max(floor_seq),
        })
    }

    /// Buffer an event and return its sequence number.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        let seq = self.write_seq + 1;
        let line = serde_json::to_vec(&WalEntry { seq, event: event.clone() })?;
        self.buffer.extend_from_slice(&line);
        self.buffer.push(b'\n');
        self.write_seq = seq;
        Ok(seq)
    }

    /// Write buffered entries and sync them to disk.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.file.write_all(&self.buffer)?;
        self.file.sync_data()?;
        self.buffer.clear();
        Ok(())
    }

    /// Drop buffered entries that were never flushed.
    ///
    /// Used when a flush fails so the in-memory sequence stays aligned with
    /// what is on disk.
    pub fn discard_unflushed(&mut self, back_to_seq: u64) {
        self.buffer.clear();
        self.write_seq = back_to_seq;
    }

    /// Flushed entries with `seq > after`, stopping at the first corrupt line.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let (entries, _) = read_entries(&self.path)?;
        Ok(entries.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Remove entries with `seq < before`, rewriting the file atomically.
    pub fn truncate_before(&mut self, before: u64) -> Result<(), WalError> {
        self.flush()?;
        let (entries, _) = read_entries(&self.path)?;
        let kept: Vec<WalEntry> = entries.into_iter().filter(|e| e.seq >= before).collect();
        let tmp = self.path.with_extension("tmp");
        write_entries(&tmp, &kept)?;
        fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }
}

/// Corrupt logs kept beside the live one: `.bak` (newest), `.bak.2`, `.bak.3`.
const KEPT_BACKUPS: usize = 3;

fn backup_path(path: &Path, generation: usize) -> PathBuf {
    match generation {
        1 => path.with_extension("bak"),
        n => path.with_extension(format!("bak.{n}")),
    }
}

/// Move `path` into the newest backup slot. Older backups shift down one
/// generation and the oldest is overwritten.
fn set_aside(path: &Path) -> Result<PathBuf, WalError> {
    for generation in (1..KEPT_BACKUPS).rev() {
        match fs::rename(backup_path(path, generation), backup_path(path, generation + 1)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    let newest = backup_path(path, 1);
    fs::rename(path, &newest)?;
    Ok(newest)
}

/// Parse entries until the first line that is not a valid entry.
fn read_entries(path: &Path) -> Result<(Vec<WalEntry>, bool), WalError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<WalEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(_) => return Ok((entries, true)),
        }
    }
    Ok((entries, false))
}

fn write_entries(path: &Path, entries: &[WalEntry]) -> Result<(), WalError> {
    let mut file = File::create(path)?;
    for entry in entries {
        serde_json::to_writer(&mut file, entry)?;
        file.write_all(b"\n")?;
    }
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
