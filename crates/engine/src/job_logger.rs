// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-job activity logs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only logger for per-job activity logs.
///
/// Writes human-readable timestamped lines to:
///   `<log_dir>/jobs/<job_id>.log`
///
/// Each `append()` call opens, writes, and closes the file. Jobs see a
/// handful of transitions, so there is nothing to keep open.
pub struct JobLogger {
    log_dir: PathBuf,
}

impl JobLogger {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn path_for(&self, job_id: &str) -> PathBuf {
        self.log_dir.join("jobs").join(format!("{job_id}.log"))
    }

    /// Append a log line for the given job.
    ///
    /// Format: `2026-01-30T08:14:09Z [job:admitted] message`
    ///
    /// Failures are logged via tracing but do not propagate.
    pub fn append(&self, job_id: &str, step: &str, message: &str) {
        let path = self.path_for(job_id);
        if let Err(e) = write_line(&path, step, message) {
            tracing::warn!(job_id, error = %e, "failed to write job log");
        }
    }

    /// All lines logged for a job so far; empty if nothing was logged.
    pub fn read(&self, job_id: &str) -> std::io::Result<Vec<String>> {
        match fs::read_to_string(self.path_for(job_id)) {
            Ok(content) => Ok(content.lines().map(String::from).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

fn write_line(path: &Path, step: &str, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    writeln!(file, "{} [{}] {}", ts, step, message)?;
    Ok(())
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
