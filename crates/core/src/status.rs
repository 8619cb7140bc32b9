// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status state machine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a job record.
///
/// `Queued` waits for the execution slot. `Pending`, `Starting` and `Running`
/// are the active phases; at most one job holds one of them at any instant.
/// The remaining three are terminal and never change once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Pending,
    Starting,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Pending => "pending",
        Starting => "starting",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Queued,
        JobStatus::Pending,
        JobStatus::Starting,
        JobStatus::Running,
        JobStatus::Succeeded,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Holding the execution slot.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Starting | JobStatus::Running)
    }

    /// Position in the forward progression of active phases.
    fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Pending => 1,
            JobStatus::Starting => 2,
            JobStatus::Running => 3,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled => 4,
        }
    }

    /// Whether the state machine permits moving from `self` to `to`.
    ///
    /// Active phases only move forward and may skip intermediate phases since
    /// the backend can report a later phase before we observe an earlier one.
    /// Success is accepted from any active phase for the same reason.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        match (self, to) {
            (Queued, Pending) | (Queued, Cancelled) => true,
            (from, to) if from.is_active() && to.is_active() => to.rank() > from.rank(),
            (from, to) if from.is_active() && to.is_terminal() => true,
            // requeue after a failed backend submission
            (Pending, Queued) => true,
            _ => false,
        }
    }

    pub fn check_transition(self, to: JobStatus) -> Result<(), TransitionError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    /// Wire form, e.g. `"RUNNING"`.
    pub fn as_upper(self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Pending => "PENDING",
            JobStatus::Starting => "STARTING",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|st| st.as_upper().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown job status: {s}"))
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
