// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch: fill the execution slot from the queue head.

use super::Engine;
use crate::error::EngineError;
use onejob_adapters::{BackendError, ComputeBackend, SubmitRequest};
use onejob_core::{BackendHandle, Clock, Event, JobId, Outcome};
use onejob_storage::{Commit, Conflict};

/// What a dispatch attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Queue empty.
    Idle,
    /// Slot already occupied.
    Busy { holder: JobId },
    /// Head admitted and accepted by the backend.
    Dispatched { id: JobId, handle: BackendHandle },
    /// Backend refused the head; it is back at position 0.
    Requeued { id: JobId },
    /// The backend accepted the job but the admission had been revoked in
    /// the meantime; the backend job was cancelled.
    Abandoned { id: JobId },
}

enum Launch {
    Done(DispatchOutcome),
    /// Job is already terminal; try the next head.
    Finalized,
}

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Admit the queue head if the slot is free.
    ///
    /// Safe to call concurrently and repeatedly: the admission is a
    /// conditional commit, so only one caller wins the slot and every other
    /// caller sees `Busy`.
    pub async fn dispatch_next(&self) -> Result<DispatchOutcome, EngineError> {
        loop {
            let head = self.store.read(|s| match s.slot_holder() {
                Some(holder) => Err(holder.clone()),
                None => Ok(s.queue_head().map(|j| j.id.clone())),
            });
            let id = match head {
                Err(holder) => return Ok(DispatchOutcome::Busy { holder }),
                Ok(None) => return Ok(DispatchOutcome::Idle),
                Ok(Some(id)) => id,
            };

            let admitted = Event::JobAdmitted { id: id.clone(), admitted_at_ms: self.now_ms() };
            match self.commit(admitted, || "claimed execution slot".to_string())? {
                Commit::Applied { .. } => {}
                Commit::Rejected(Conflict::SlotHeld { holder }) => {
                    tracing::debug!(job_id = %id, %holder, "slot contention, another dispatcher won");
                    return Ok(DispatchOutcome::Busy { holder });
                }
                Commit::Rejected(conflict) => {
                    // Head withdrawn between read and commit
                    tracing::debug!(job_id = %id, %conflict, "queue head changed, reselecting");
                    continue;
                }
            }
            tracing::info!(job_id = %id, "job admitted");

            match self.launch(&id).await? {
                Launch::Done(outcome) => return Ok(outcome),
                Launch::Finalized => continue,
            }
        }
    }

    /// Submit an admitted job to the backend and record the result.
    async fn launch(&self, id: &JobId) -> Result<Launch, EngineError> {
        let job = self.require_job(id.as_str())?;
        let effective = match job.parameters.validate() {
            Ok(effective) => effective,
            Err(e) => {
                self.record_outcome(id, Outcome::Failed { reason: e.to_string() })?;
                return Ok(Launch::Finalized);
            }
        };
        let request = SubmitRequest::new(id.clone(), job.input_ref.clone()).env(effective.to_env());

        match self.backend.submit(&request, self.notices.clone()).await {
            Ok(handle) => self.record_dispatch(id, handle).await,
            Err(e) => self.handle_submit_failure(id, e),
        }
    }

    async fn record_dispatch(&self, id: &JobId, handle: BackendHandle) -> Result<Launch, EngineError> {
        let event = Event::JobDispatched {
            id: id.clone(),
            handle: handle.clone(),
            started_at_ms: self.now_ms(),
        };
        let message = || format!("dispatched to {} as {}", self.backend.name(), handle);
        let committed = self.commit(event, message)?;
        let finished = || self.store.get_job(id.as_str()).is_some_and(|j| j.is_terminal());
        match committed {
            Commit::Applied { .. } => {
                tracing::info!(job_id = %id, %handle, backend = self.backend.name(), "job dispatched");
            }
            Commit::Rejected(_) if finished() => {
                // Finished and finalized by its notice before submit returned
                tracing::debug!(job_id = %id, %handle, "job completed before dispatch was recorded");
                return Ok(Launch::Finalized);
            }
            Commit::Rejected(conflict) => {
                tracing::warn!(
                    job_id = %id,
                    %handle,
                    %conflict,
                    "admission revoked during submit, cancelling backend job"
                );
                if let Err(e) = self.backend.cancel(&handle).await {
                    tracing::warn!(job_id = %id, %handle, error = %e, "failed to cancel orphaned backend job");
                }
                return Ok(Launch::Done(DispatchOutcome::Abandoned { id: id.clone() }));
            }
        }

        // Cancel arrived while the submit was in flight
        if self.store.get_job(id.as_str()).is_some_and(|j| j.cancel_requested)
            && self.cancel_at_backend(id, &handle).await?
        {
            return Ok(Launch::Finalized);
        }
        Ok(Launch::Done(DispatchOutcome::Dispatched { id: id.clone(), handle }))
    }

    fn handle_submit_failure(&self, id: &JobId, error: BackendError) -> Result<Launch, EngineError> {
        let job = self.require_job(id.as_str())?;
        if job.cancel_requested {
            self.record_outcome(id, Outcome::Cancelled)?;
            return Ok(Launch::Finalized);
        }

        let attempts = job.dispatch_attempts + 1;
        if attempts >= self.config.max_dispatch_attempts {
            tracing::warn!(job_id = %id, attempts, error = %error, "dispatch attempts exhausted");
            self.record_outcome(id, Outcome::Failed { reason: error.to_string() })?;
            return Ok(Launch::Finalized);
        }

        tracing::warn!(job_id = %id, attempts, error = %error, "backend submit failed, requeued at head");
        let event = Event::JobRequeued { id: id.clone(), error: error.to_string() };
        let message = || format!("requeued after attempt {attempts}: {error}");
        if let Commit::Rejected(conflict) = self.commit(event, message)? {
            tracing::warn!(job_id = %id, %conflict, "requeue refused");
        }
        Ok(Launch::Done(DispatchOutcome::Requeued { id: id.clone() }))
    }
}
