// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record

use crate::params::Parameters;
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier of a job record, assigned at submission.
    pub struct JobId("job-");
}

/// Opaque reference to a job inside the compute backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendHandle(String);

impl BackendHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BackendHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Terminal result of a job's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded {
        #[serde(default)]
        artifacts: Vec<String>,
    },
    Failed {
        reason: String,
    },
    Cancelled,
}

crate::simple_display! {
    Outcome {
        Succeeded { .. } => "succeeded",
        Failed { .. } => "failed",
        Cancelled => "cancelled",
    }
}

impl Outcome {
    pub fn status(&self) -> JobStatus {
        match self {
            Outcome::Succeeded { .. } => JobStatus::Succeeded,
            Outcome::Failed { .. } => JobStatus::Failed,
            Outcome::Cancelled => JobStatus::Cancelled,
        }
    }
}

/// Durable record of one submitted job.
///
/// Timestamps are epoch milliseconds and each is written by exactly one
/// transition. `queue_position` is `Some` only while queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    pub input_ref: String,
    #[serde(default)]
    pub parameters: Parameters,
    pub submitted_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at_ms: Option<u64>,
    /// When the job claimed the execution slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admitted_at_ms: Option<u64>,
    /// When the backend accepted the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_handle: Option<BackendHandle>,
    /// Artifact keys, set only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Backend submissions that failed and sent the job back to the queue.
    #[serde(default)]
    pub dispatch_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dispatch_error: Option<String>,
    /// Client asked to cancel while the job was active.
    #[serde(default)]
    pub cancel_requested: bool,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Human-readable status line.
    pub fn display_message(&self) -> String {
        display_message(self.status, self.queue_position, self.failure_reason.as_deref())
    }
}

/// Human-readable message for a status, as shown to clients.
pub fn display_message(
    status: JobStatus,
    queue_position: Option<u32>,
    failure_reason: Option<&str>,
) -> String {
    match status {
        JobStatus::Queued => match queue_position {
            Some(pos) => format!("Queued (position {pos})"),
            None => "Queued".to_string(),
        },
        JobStatus::Pending => "Queued...".to_string(),
        JobStatus::Starting => "Starting...".to_string(),
        JobStatus::Running => "Running...".to_string(),
        JobStatus::Succeeded => "Completed successfully".to_string(),
        JobStatus::Failed => match failure_reason {
            Some(reason) => format!("Failed: {reason}"),
            None => "Failed".to_string(),
        },
        JobStatus::Cancelled => "Cancelled".to_string(),
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            id: JobId = "job-test1",
            input_ref: String = "uploads/input.xlsx",
        }
        set {
            status: JobStatus = JobStatus::Queued,
            parameters: Parameters = Parameters::new(),
            submitted_at_ms: u64 = 1_000_000,
            dispatch_attempts: u32 = 0,
            cancel_requested: bool = false,
        }
        option {
            queue_position: u32 = None,
            queued_at_ms: u64 = None,
            admitted_at_ms: u64 = None,
            started_at_ms: u64 = None,
            completed_at_ms: u64 = None,
            backend_handle: BackendHandle = None,
            result: Vec<String> = None,
            failure_reason: String = None,
            last_dispatch_error: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
