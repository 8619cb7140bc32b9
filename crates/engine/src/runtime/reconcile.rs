// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation: catch completions whose push never arrived, recover
//! abandoned admissions, then refill the slot.

use super::{DispatchOutcome, Engine};
use crate::error::EngineError;
use onejob_adapters::{BackendError, ComputeBackend};
use onejob_core::{Clock, Event, Job, JobId, Outcome};
use onejob_storage::Commit;

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Periodic pass over the active job followed by a dispatch attempt.
    pub async fn reconcile(&self) -> Result<DispatchOutcome, EngineError> {
        if let Some(job) = self.store.read(|s| s.active_job().cloned()) {
            match job.backend_handle.clone() {
                Some(handle) => self.poll_active(&job, &handle).await?,
                None => {
                    let age = self.now_ms().saturating_sub(job.admitted_at_ms.unwrap_or(0));
                    if age >= self.config.stale_admission_ms {
                        self.release_admission(&job, "admission never reached the backend")?;
                    }
                }
            }
        }
        self.dispatch_next().await
    }

    /// Startup recovery. A handle-less admission left by a previous daemon
    /// has no submit in flight any more, so it goes straight back to the
    /// queue head.
    pub async fn recover(&self) -> Result<DispatchOutcome, EngineError> {
        let orphan = self.store.read(|s| s.active_job().filter(|j| j.backend_handle.is_none()).cloned());
        if let Some(job) = orphan {
            self.release_admission(&job, "daemon restarted before dispatch")?;
        }
        self.reconcile().await
    }

    async fn poll_active(&self, job: &Job, handle: &onejob_core::BackendHandle) -> Result<(), EngineError> {
        let report = match self.backend.query_phase(handle).await {
            Ok(report) => report,
            Err(BackendError::NotFound(_)) => {
                tracing::warn!(job_id = %job.id, %handle, "backend lost track of job");
                let reason = "backend lost track of job".to_string();
                self.record_outcome(&job.id, Outcome::Failed { reason })?;
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(job_id = %job.id, %handle, error = %e, "reconcile query failed");
                return Ok(());
            }
        };

        if let Some(outcome) = report.outcome() {
            tracing::info!(job_id = %job.id, %outcome, "reconcile found terminal phase");
            self.record_outcome(&job.id, outcome)?;
            return Ok(());
        }

        let live = report.phase.as_status();
        if live != job.status && job.status.can_transition_to(live) {
            let event = Event::JobPhaseChanged { id: job.id.clone(), status: live };
            if self.commit(event, || format!("backend phase {live}"))?.is_applied() {
                tracing::info!(job_id = %job.id, status = %live, "job phase advanced");
            }
        }
        Ok(())
    }

    fn release_admission(&self, job: &Job, reason: &str) -> Result<(), EngineError> {
        if job.cancel_requested {
            self.record_outcome(&job.id, Outcome::Cancelled)?;
            return Ok(());
        }
        tracing::warn!(job_id = %job.id, reason, "requeueing abandoned admission");
        let event = Event::JobRequeued { id: job.id.clone(), error: reason.to_string() };
        if let Commit::Rejected(conflict) = self.commit(event, || format!("requeued: {reason}"))? {
            tracing::debug!(job_id = %job.id, %conflict, "abandoned admission already moved on");
        }
        Ok(())
    }

    /// ID of the job holding the slot, if any.
    pub fn active_job_id(&self) -> Option<JobId> {
        self.store.read(|s| s.slot_holder().cloned())
    }
}
