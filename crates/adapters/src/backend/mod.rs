// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute backend abstraction.
//!
//! A backend accepts one job at a time from the engine, reports its phase on
//! request, and pushes a [`CompletionNotice`] when the job terminates. Pushes
//! are at-least-once and may be lost entirely; the engine's reconcile poll
//! covers the gap.

mod k8s;
mod process;
mod router;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use k8s::{KubernetesBackend, KubernetesConfig};
pub use process::ProcessBackend;
pub use router::BackendRouter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackend};

use async_trait::async_trait;
use onejob_core::{BackendHandle, JobId, Outcome, PhaseReport};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend job not found: {0}")]
    NotFound(String),
    #[error("submit failed: {0}")]
    SubmitFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("cancel failed: {0}")]
    CancelFailed(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Everything a backend needs to start one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub job_id: JobId,
    pub input_ref: String,
    /// Effective parameters rendered as environment variables.
    pub env: Vec<(String, String)>,
}

impl SubmitRequest {
    pub fn new(job_id: JobId, input_ref: impl Into<String>) -> Self {
        Self { job_id, input_ref: input_ref.into(), env: Vec::new() }
    }

    onejob_core::setters! {
        set { env: Vec<(String, String)> }
    }

    /// Name under which the backend runs the job, `onejob-<id suffix>`.
    pub fn backend_name(&self) -> String {
        format!("onejob-{}", self.job_id.suffix())
    }

    /// Full worker environment: identity, input and parameters.
    pub fn worker_env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            ("JOB_ID".to_string(), self.job_id.to_string()),
            ("INPUT_REF".to_string(), self.input_ref.clone()),
        ];
        env.extend(self.env.iter().cloned());
        env
    }
}

/// Terminal outcome pushed by a backend.
///
/// Carries the job id as well as the handle: a fast job can finish before
/// the dispatch that launched it has recorded the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub job_id: JobId,
    pub handle: BackendHandle,
    pub outcome: Outcome,
}

#[async_trait]
pub trait ComputeBackend: Clone + Send + Sync + 'static {
    /// Start a job. Returns once the backend has accepted it; never waits
    /// for the job to run. The terminal outcome is later sent on `notices`.
    async fn submit(
        &self,
        request: &SubmitRequest,
        notices: mpsc::Sender<CompletionNotice>,
    ) -> Result<BackendHandle, BackendError>;

    /// Point-in-time phase of a submitted job.
    async fn query_phase(&self, handle: &BackendHandle) -> Result<PhaseReport, BackendError>;

    /// Ask the backend to terminate a job. Completion is still observed
    /// through a notice or a query.
    async fn cancel(&self, handle: &BackendHandle) -> Result<(), BackendError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
