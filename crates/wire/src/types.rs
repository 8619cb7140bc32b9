// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTO structs for the IPC protocol.

use onejob_core::{Job, JobStatus, Parameters};
use serde::{Deserialize, Serialize};

/// Summary of a job for listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    pub input_ref: String,
    pub submitted_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    pub message: String,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        JobSummary {
            id: job.id.to_string(),
            status: job.status,
            queue_position: job.queue_position,
            input_ref: job.input_ref.clone(),
            submitted_at_ms: job.submitted_at_ms,
            completed_at_ms: job.completed_at_ms,
            message: job.display_message(),
        }
    }
}

/// Detailed job information
///
/// `status` may be ahead of the stored record when the daemon overlaid a
/// live backend phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDetail {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    pub input_ref: String,
    #[serde(default)]
    pub parameters: Parameters,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_detail: Option<String>,
    pub submitted_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub dispatch_attempts: u32,
    #[serde(default)]
    pub cancel_requested: bool,
}

impl JobDetail {
    /// Detail for the stored record as-is.
    pub fn from_job(job: &Job) -> Self {
        Self::with_overlay(job, job.status, job.display_message(), None)
    }

    /// Detail with a status, message and progress computed by the daemon.
    pub fn with_overlay(
        job: &Job,
        status: JobStatus,
        message: String,
        progress_detail: Option<String>,
    ) -> Self {
        JobDetail {
            id: job.id.to_string(),
            status,
            queue_position: job.queue_position,
            input_ref: job.input_ref.clone(),
            parameters: job.parameters.clone(),
            message,
            progress_detail,
            submitted_at_ms: job.submitted_at_ms,
            started_at_ms: job.started_at_ms,
            completed_at_ms: job.completed_at_ms,
            backend_handle: job.backend_handle.as_ref().map(|h| h.to_string()),
            result: job.result.clone(),
            failure_reason: job.failure_reason.clone(),
            dispatch_attempts: job.dispatch_attempts,
            cancel_requested: job.cancel_requested,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
