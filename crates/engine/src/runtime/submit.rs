// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission

use super::Engine;
use crate::error::EngineError;
use onejob_adapters::ComputeBackend;
use onejob_core::{validate_input_ref, Clock, Event, Job, JobId, Parameters};
use onejob_storage::Commit;

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Create a job record and try to admit it immediately.
    ///
    /// Invalid input is rejected before anything is written. The new record
    /// joins the tail of the queue, then the dispatcher fills the slot from
    /// the head; when nothing else is waiting and the slot is free, that is
    /// this job. A dispatch failure does not fail the submission: the job
    /// stays queued and reconciliation retries it.
    pub async fn submit(&self, input_ref: &str, parameters: Parameters) -> Result<Job, EngineError> {
        validate_input_ref(input_ref)?;
        parameters.validate()?;

        let id = JobId::generate();
        let event = Event::JobCreated {
            id: id.clone(),
            input_ref: input_ref.to_string(),
            parameters,
            submitted_at_ms: self.now_ms(),
        };
        if let Commit::Rejected(conflict) = self.commit(event, || format!("submitted input={input_ref}"))? {
            return Err(conflict.into());
        }
        tracing::info!(job_id = %id, input_ref, "job submitted");

        if let Err(e) = self.dispatch_next().await {
            tracing::warn!(job_id = %id, error = %e, "dispatch after submit failed");
        }
        self.require_job(id.as_str())
    }
}
