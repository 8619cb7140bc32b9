// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend-reported execution phases

use crate::job::Outcome;
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

/// Phase of a job as reported by the compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Pending,
    Starting,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

crate::simple_display! {
    Phase {
        Pending => "pending",
        Starting => "starting",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed | Phase::Cancelled)
    }

    pub fn as_status(self) -> JobStatus {
        match self {
            Phase::Pending => JobStatus::Pending,
            Phase::Starting => JobStatus::Starting,
            Phase::Running => JobStatus::Running,
            Phase::Succeeded => JobStatus::Succeeded,
            Phase::Failed => JobStatus::Failed,
            Phase::Cancelled => JobStatus::Cancelled,
        }
    }

    /// Normalize a batch scheduler's raw status name.
    ///
    /// Submission and scheduling states collapse onto `Pending` and
    /// `Starting`; unknown names yield `None`.
    pub fn from_backend_name(raw: &str) -> Option<Phase> {
        let phase = match raw.to_ascii_uppercase().as_str() {
            "SUBMITTED" | "PENDING" => Phase::Pending,
            "RUNNABLE" | "STARTING" => Phase::Starting,
            "RUNNING" => Phase::Running,
            "SUCCEEDED" | "COMPLETE" | "COMPLETED" => Phase::Succeeded,
            "FAILED" => Phase::Failed,
            "CANCELLED" | "CANCELED" => Phase::Cancelled,
            _ => return None,
        };
        Some(phase)
    }
}

/// Point-in-time answer to a backend phase query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Output artifact keys, meaningful only for `Succeeded`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,
    /// Failure reason, meaningful only for `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Free-form progress text from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PhaseReport {
    pub fn new(phase: Phase) -> Self {
        Self { phase, artifacts: Vec::new(), reason: None, detail: None }
    }

    crate::setters! {
        set { artifacts: Vec<String> }
        option { reason: String, detail: String }
    }

    /// Terminal outcome carried by this report, if the phase is terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Succeeded => Some(Outcome::Succeeded { artifacts: self.artifacts.clone() }),
            Phase::Failed => Some(Outcome::Failed {
                reason: self
                    .reason
                    .clone()
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            }),
            Phase::Cancelled => Some(Outcome::Cancelled),
            Phase::Pending | Phase::Starting | Phase::Running => None,
        }
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
