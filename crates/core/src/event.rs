// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events recorded in the write-ahead log.
//!
//! Every mutation of a job record is one of these. The store checks an
//! event against current state before appending it, then applies it to the
//! materialized view; replaying the log reproduces the same view.

use crate::job::{BackendHandle, JobId, Outcome};
use crate::params::Parameters;
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// New record appended to the tail of the queue.
    #[serde(rename = "job:created")]
    JobCreated { id: JobId, input_ref: String, parameters: Parameters, submitted_at_ms: u64 },

    /// Queued job claims the empty execution slot.
    #[serde(rename = "job:admitted")]
    JobAdmitted { id: JobId, admitted_at_ms: u64 },

    /// Backend accepted the admitted job.
    #[serde(rename = "job:dispatched")]
    JobDispatched { id: JobId, handle: BackendHandle, started_at_ms: u64 },

    /// Backend submission failed; the job returns to the queue head and
    /// the slot is released.
    #[serde(rename = "job:requeued")]
    JobRequeued { id: JobId, error: String },

    /// Backend reported forward progress within the active phases.
    #[serde(rename = "job:phase")]
    JobPhaseChanged { id: JobId, status: JobStatus },

    /// Client asked to cancel an active job.
    #[serde(rename = "job:cancel_requested")]
    JobCancelRequested { id: JobId },

    /// Active job reached a terminal outcome; the slot is released.
    #[serde(rename = "job:completed")]
    JobCompleted { id: JobId, outcome: Outcome, completed_at_ms: u64 },

    /// Queued job cancelled before admission.
    #[serde(rename = "job:withdrawn")]
    JobWithdrawn { id: JobId, completed_at_ms: u64 },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::JobCreated { .. } => "job:created",
            Event::JobAdmitted { .. } => "job:admitted",
            Event::JobDispatched { .. } => "job:dispatched",
            Event::JobRequeued { .. } => "job:requeued",
            Event::JobPhaseChanged { .. } => "job:phase",
            Event::JobCancelRequested { .. } => "job:cancel_requested",
            Event::JobCompleted { .. } => "job:completed",
            Event::JobWithdrawn { .. } => "job:withdrawn",
        }
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            Event::JobCreated { id, .. }
            | Event::JobAdmitted { id, .. }
            | Event::JobDispatched { id, .. }
            | Event::JobRequeued { id, .. }
            | Event::JobPhaseChanged { id, .. }
            | Event::JobCancelRequested { id }
            | Event::JobCompleted { id, .. }
            | Event::JobWithdrawn { id, .. } => id,
        }
    }

    /// One-line summary for logs.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::JobCreated { id, input_ref, .. } => format!("{t} id={id} input={input_ref}"),
            Event::JobDispatched { id, handle, .. } => format!("{t} id={id} handle={handle}"),
            Event::JobRequeued { id, error } => format!("{t} id={id} error={error}"),
            Event::JobPhaseChanged { id, status } => format!("{t} id={id} status={status}"),
            Event::JobCompleted { id, outcome, .. } => format!("{t} id={id} outcome={outcome}"),
            Event::JobAdmitted { id, .. }
            | Event::JobCancelRequested { id }
            | Event::JobWithdrawn { id, .. } => format!("{t} id={id}"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
