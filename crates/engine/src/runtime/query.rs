// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status, listing and results.

use super::Engine;
use crate::error::EngineError;
use onejob_adapters::ComputeBackend;
use onejob_core::{display_message, Clock, Job, JobId, JobStatus};

/// Client-facing projection of a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub job: Job,
    /// Best-known status: stored, or a live backend phase further along.
    pub status: JobStatus,
    pub progress_detail: Option<String>,
    pub message: String,
}

impl JobView {
    fn stored(job: Job) -> Self {
        let status = job.status;
        let message = job.display_message();
        Self { job, status, progress_detail: None, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSummary {
    pub active: Option<JobId>,
    pub queued: usize,
    pub total: usize,
    pub backend: &'static str,
}

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Best-known status of a job.
    ///
    /// For an active job the backend is queried live. Progress is overlaid
    /// on the view without being stored; a terminal phase the store has not
    /// seen yet is finalized on the spot.
    pub async fn status(&self, id: &str) -> Result<JobView, EngineError> {
        let job = self.require_job(id)?;
        let Some(handle) = job.backend_handle.clone().filter(|_| job.is_active()) else {
            return Ok(JobView::stored(job));
        };

        let report = match self.backend.query_phase(&handle).await {
            Ok(report) => report,
            Err(e) => {
                tracing::debug!(job_id = %job.id, %handle, error = %e, "live status query failed");
                return Ok(JobView::stored(job));
            }
        };

        if let Some(outcome) = report.outcome() {
            self.finalize(&job.id, outcome).await?;
            return Ok(JobView::stored(self.require_job(job.id.as_str())?));
        }

        let live = report.phase.as_status();
        let status = if live != job.status && job.status.can_transition_to(live) {
            live
        } else {
            job.status
        };
        Ok(JobView {
            message: display_message(status, job.queue_position, job.failure_reason.as_deref()),
            status,
            progress_detail: report.detail,
            job,
        })
    }

    /// Jobs newest first.
    pub fn list(&self, limit: Option<usize>) -> Vec<Job> {
        self.store.read(|s| s.jobs_newest_first(limit).into_iter().cloned().collect())
    }

    /// Artifact keys of a succeeded job.
    pub fn results(&self, id: &str) -> Result<(JobId, Vec<String>), EngineError> {
        let job = self.require_job(id)?;
        if job.status != JobStatus::Succeeded {
            return Err(EngineError::NotReady { status: job.status });
        }
        Ok((job.id, job.result.unwrap_or_default()))
    }

    /// Lines of the job's activity log.
    pub fn job_log(&self, id: &str) -> Result<(JobId, Vec<String>), EngineError> {
        let job = self.require_job(id)?;
        let lines = match &self.logger {
            Some(logger) => logger.read(job.id.as_str()).unwrap_or_else(|e| {
                tracing::warn!(job_id = %job.id, error = %e, "failed to read job log");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok((job.id, lines))
    }

    pub fn summary(&self) -> EngineSummary {
        self.store.read(|s| EngineSummary {
            active: s.slot_holder().cloned(),
            queued: s.queue_len(),
            total: s.jobs.len(),
            backend: self.backend.name(),
        })
    }
}
