// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion: push notices, external reports and reconcile results all
//! converge on one idempotent finalize.

use super::Engine;
use crate::error::EngineError;
use onejob_adapters::{CompletionNotice, ComputeBackend};
use onejob_core::{Clock, Event, JobId, Outcome};
use onejob_storage::Commit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeOutcome {
    /// The job was active and is now terminal.
    Finalized { id: JobId, outcome: Outcome },
    /// Duplicate or out-of-date report; nothing changed.
    Stale,
}

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Handle a completion pushed by the backend adapter.
    ///
    /// Notices are matched by handle. A job can also finish before its
    /// dispatch records the handle; that notice is matched by job ID, but
    /// only while the job holds the slot without a handle.
    pub async fn handle_notice(&self, notice: CompletionNotice) -> Result<NoticeOutcome, EngineError> {
        let job = self.store.read(|s| {
            if let Some(job) = s.job_by_handle(&notice.handle) {
                return Some(job.id.clone());
            }
            s.active_job()
                .filter(|j| j.id == notice.job_id && j.backend_handle.is_none())
                .map(|j| j.id.clone())
        });
        match job {
            Some(id) => self.finalize(&id, notice.outcome).await,
            None => {
                tracing::debug!(
                    job_id = %notice.job_id,
                    handle = %notice.handle,
                    "notice for unknown handle ignored"
                );
                Ok(NoticeOutcome::Stale)
            }
        }
    }

    /// Handle a completion reported over IPC by something other than the
    /// adapter. `target` is a backend handle or a job ID (prefix allowed).
    pub async fn complete_external(
        &self,
        target: &str,
        outcome: Outcome,
    ) -> Result<NoticeOutcome, EngineError> {
        let id = self.store.read(|s| {
            s.job_by_handle(&target.into())
                .or_else(|| s.get_job(target))
                .map(|j| j.id.clone())
        });
        let id = id.ok_or_else(|| EngineError::NotFound(target.to_string()))?;
        self.finalize(&id, outcome).await
    }

    /// Record a terminal outcome for the active job and refill the slot.
    ///
    /// A job that is not the slot holder, or is already terminal, is left
    /// untouched and the report is treated as stale.
    pub async fn finalize(&self, id: &JobId, outcome: Outcome) -> Result<NoticeOutcome, EngineError> {
        let Some(outcome) = self.record_outcome(id, outcome)? else {
            return Ok(NoticeOutcome::Stale);
        };
        if let Err(e) = self.dispatch_next().await {
            tracing::warn!(job_id = %id, error = %e, "dispatch after completion failed");
        }
        Ok(NoticeOutcome::Finalized { id: id.clone(), outcome })
    }

    /// Commit a terminal outcome. Returns the outcome actually recorded, or
    /// `None` if the job was not in a state to accept it.
    ///
    /// A failure reported after the client asked to cancel is recorded as a
    /// cancellation; a success is kept.
    pub(super) fn record_outcome(
        &self,
        id: &JobId,
        outcome: Outcome,
    ) -> Result<Option<Outcome>, EngineError> {
        let cancel_requested = self.store.get_job(id.as_str()).is_some_and(|j| j.cancel_requested);
        let outcome = match outcome {
            Outcome::Failed { .. } if cancel_requested => Outcome::Cancelled,
            other => other,
        };

        let event = Event::JobCompleted {
            id: id.clone(),
            outcome: outcome.clone(),
            completed_at_ms: self.now_ms(),
        };
        let message = || match &outcome {
            Outcome::Succeeded { artifacts } => format!("succeeded artifacts={}", artifacts.join(",")),
            Outcome::Failed { reason } => format!("failed: {reason}"),
            Outcome::Cancelled => "cancelled".to_string(),
        };
        match self.commit(event, message)? {
            Commit::Applied { .. } => {
                tracing::info!(job_id = %id, %outcome, "job finalized");
                Ok(Some(outcome))
            }
            Commit::Rejected(conflict) => {
                tracing::debug!(job_id = %id, %conflict, "stale completion ignored");
                Ok(None)
            }
        }
    }
}
