// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::{JobDetail, JobSummary};

/// Category of a failed request, used by the CLI to choose an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    NotReady,
    Internal,
}

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Single job details
    Job { job: Box<JobDetail> },

    /// List of jobs, newest first
    Jobs { jobs: Vec<JobSummary> },

    /// Artifacts of a succeeded job
    Results { id: String, artifacts: Vec<String> },

    /// Lines of a job's activity log
    JobLogs { id: String, lines: Vec<String> },

    /// Daemon status
    Status {
        uptime_secs: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<String>,
        queued: usize,
        total: usize,
        backend: String,
    },

    /// Daemon is shutting down
    ShuttingDown,

    /// Request failed
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error { kind, message: message.into() }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
