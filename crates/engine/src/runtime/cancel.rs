// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation

use super::Engine;
use crate::error::EngineError;
use onejob_adapters::{BackendError, ComputeBackend};
use onejob_core::{BackendHandle, Clock, Event, Job, JobId, JobStatus, Outcome};
use onejob_storage::Commit;

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Cancel a job by ID or prefix.
    ///
    /// Queued jobs are withdrawn on the spot. Active jobs are flagged and the
    /// backend is asked to stop them; the record turns `CANCELLED` once the
    /// terminal outcome comes back. Terminal jobs are returned unchanged.
    pub async fn cancel(&self, id: &str) -> Result<Job, EngineError> {
        let job = self.require_job(id)?;
        let id = job.id.clone();

        match job.status {
            JobStatus::Queued => {
                let event = Event::JobWithdrawn { id: id.clone(), completed_at_ms: self.now_ms() };
                match self.commit(event, || "cancelled while queued".to_string())? {
                    Commit::Applied { .. } => {
                        tracing::info!(job_id = %id, "queued job cancelled");
                    }
                    // Admitted between read and commit
                    Commit::Rejected(_) => self.cancel_active(&id).await?,
                }
            }
            status if status.is_active() => self.cancel_active(&id).await?,
            _ => {}
        }
        self.require_job(id.as_str())
    }

    async fn cancel_active(&self, id: &JobId) -> Result<(), EngineError> {
        let Some(job) = self.store.get_job(id.as_str()) else {
            return Err(EngineError::NotFound(id.to_string()));
        };
        if !job.is_active() {
            return Ok(());
        }
        if !job.cancel_requested {
            let event = Event::JobCancelRequested { id: id.clone() };
            self.commit(event, || "cancel requested".to_string())?;
            tracing::info!(job_id = %id, "cancel requested for active job");
        }
        // Without a handle the submit is still in flight; dispatch cancels
        // at the backend once the handle is recorded.
        if let Some(handle) = &job.backend_handle {
            if self.cancel_at_backend(id, handle).await? {
                if let Err(e) = self.dispatch_next().await {
                    tracing::warn!(job_id = %id, error = %e, "dispatch after cancel failed");
                }
            }
        }
        Ok(())
    }

    /// Ask the backend to stop a job. A backend that no longer knows the job
    /// cannot report its end, so the cancellation is recorded directly.
    ///
    /// Returns whether the job was finalized here, in which case the caller
    /// owns refilling the slot.
    pub(super) async fn cancel_at_backend(
        &self,
        id: &JobId,
        handle: &BackendHandle,
    ) -> Result<bool, EngineError> {
        match self.backend.cancel(handle).await {
            Ok(()) => Ok(false),
            Err(BackendError::NotFound(_)) => {
                tracing::warn!(job_id = %id, %handle, "backend lost job during cancel");
                Ok(self.record_outcome(id, Outcome::Cancelled)?.is_some())
            }
            Err(e) => {
                // Reconciliation observes the eventual outcome
                tracing::warn!(job_id = %id, %handle, error = %e, "backend cancel failed");
                Ok(false)
            }
        }
    }
}
