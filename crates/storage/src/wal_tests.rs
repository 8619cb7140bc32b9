// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::test_support::created;
use onejob_core::JobId;
use std::io::Write;
use tempfile::tempdir;

fn ids(entries: &[WalEntry]) -> Vec<String> {
    entries.iter().map(|e| e.event.job_id().to_string()).collect()
}

#[test]
fn open_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal/events.wal");

    let wal = Wal::open(&path, 0).unwrap();

    assert!(path.exists());
    assert_eq!(wal.write_seq(), 0);
}

#[test]
fn append_assigns_sequence_and_flush_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    assert_eq!(wal.append(&created("job-1")).unwrap(), 1);
    assert_eq!(wal.append(&created("job-2")).unwrap(), 2);
    assert!(wal.entries_after(0).unwrap().is_empty(), "nothing flushed yet");

    wal.flush().unwrap();
    let entries = wal.entries_after(0).unwrap();
    assert_eq!(ids(&entries), ["job-1", "job-2"]);
}

#[test]
fn reopen_continues_numbering() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&created("job-1")).unwrap();
        wal.append(&created("job-2")).unwrap();
        wal.flush().unwrap();
    }

    let mut wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 2);
    assert_eq!(wal.append(&created("job-3")).unwrap(), 3);
}

#[test]
fn floor_seq_wins_over_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");

    let mut wal = Wal::open(&path, 40).unwrap();
    assert_eq!(wal.append(&created("job-1")).unwrap(), 41);
}

#[test]
fn entries_after_filters_by_seq() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    for id in ["job-1", "job-2", "job-3"] {
        wal.append(&created(id)).unwrap();
    }
    wal.flush().unwrap();

    let entries = wal.entries_after(1).unwrap();
    assert_eq!(entries.iter().map(|e| e.seq).collect::<Vec<_>>(), [2, 3]);
}

#[test]
fn truncate_before_keeps_tail_and_accepts_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    for id in ["job-1", "job-2", "job-3"] {
        wal.append(&created(id)).unwrap();
    }
    wal.flush().unwrap();

    wal.truncate_before(3).unwrap();
    wal.append(&created("job-4")).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(ids(&entries), ["job-3", "job-4"]);
    assert_eq!(entries[1].seq, 4);
}

#[test]
fn discard_unflushed_rewinds_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    wal.append(&created("job-1")).unwrap();
    wal.discard_unflushed(0);
    wal.flush().unwrap();

    assert_eq!(wal.write_seq(), 0);
    assert!(wal.entries_after(0).unwrap().is_empty());
}

#[test]
fn corrupt_tail_is_rotated_and_valid_prefix_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&created("job-1")).unwrap();
        wal.append(&created("job-2")).unwrap();
        wal.flush().unwrap();
    }
    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"not-valid-json\n").unwrap();
    }

    let wal = Wal::open(&path, 0).unwrap();

    assert_eq!(wal.write_seq(), 2);
    assert!(path.with_extension("bak").exists());
    assert_eq!(ids(&wal.entries_after(0).unwrap()), ["job-1", "job-2"]);
}

#[test]
fn binary_garbage_opens_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    std::fs::write(&path, b"\x80\x81\x82\xff\xfe\n").unwrap();

    let wal = Wal::open(&path, 0).unwrap();

    assert_eq!(wal.write_seq(), 0);
    assert!(path.with_extension("bak").exists());
}

#[test]
fn repeated_corruption_keeps_three_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");

    for i in 1..=4u8 {
        std::fs::write(&path, [i; 8]).unwrap();
        Wal::open(&path, 0).unwrap();
    }

    assert_eq!(std::fs::read(path.with_extension("bak")).unwrap(), vec![4u8; 8]);
    assert_eq!(std::fs::read(path.with_extension("bak.2")).unwrap(), vec![3u8; 8]);
    assert_eq!(std::fs::read(path.with_extension("bak.3")).unwrap(), vec![2u8; 8]);
    assert!(!path.with_extension("bak.4").exists());
}

#[test]
fn entries_round_trip_events() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    let event = Event::JobCancelRequested { id: JobId::from_string("job-9") };
    wal.append(&event).unwrap();
    wal.flush().unwrap();

    assert_eq!(wal.entries_after(0).unwrap()[0].event, event);
}
