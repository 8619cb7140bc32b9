// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preconditions for each event.

use super::MaterializedState;
use onejob_core::{Event, Job, JobId, JobStatus, TransitionError};
use thiserror::Error;

/// Why an event was refused by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("execution slot held by {holder}")]
    SlotHeld { holder: JobId },
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("job {0} does not hold the execution slot")]
    NotSlotHolder(JobId),
    #[error("job {0} already has a backend handle")]
    AlreadyDispatched(JobId),
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}

pub(super) fn check(state: &MaterializedState, event: &Event) -> Result<(), Conflict> {
    match event {
        Event::JobCreated { id, .. } => {
            if state.jobs.contains_key(id.as_str()) {
                return Err(Conflict::AlreadyExists(id.clone()));
            }
            Ok(())
        }

        Event::JobAdmitted { id, .. } => {
            if let Some(holder) = &state.slot {
                return Err(Conflict::SlotHeld { holder: holder.clone() });
            }
            job(state, id)?.status.check_transition(JobStatus::Pending)?;
            Ok(())
        }

        Event::JobDispatched { id, .. } => {
            let job = slot_holder(state, id)?;
            job.status.check_transition(JobStatus::Starting)?;
            if job.backend_handle.is_some() {
                return Err(Conflict::AlreadyDispatched(id.clone()));
            }
            Ok(())
        }

        Event::JobRequeued { id, .. } => {
            let job = slot_holder(state, id)?;
            job.status.check_transition(JobStatus::Queued)?;
            if job.backend_handle.is_some() {
                return Err(Conflict::AlreadyDispatched(id.clone()));
            }
            Ok(())
        }

        Event::JobPhaseChanged { id, status } => {
            let job = job(state, id)?;
            if !status.is_active() {
                return Err(TransitionError { from: job.status, to: *status }.into());
            }
            job.status.check_transition(*status)?;
            Ok(())
        }

        Event::JobCancelRequested { id } => {
            let job = job(state, id)?;
            if !job.is_active() {
                return Err(TransitionError { from: job.status, to: JobStatus::Cancelled }.into());
            }
            Ok(())
        }

        Event::JobCompleted { id, outcome, .. } => {
            let job = slot_holder(state, id)?;
            job.status.check_transition(outcome.status())?;
            Ok(())
        }

        Event::JobWithdrawn { id, .. } => {
            let job = job(state, id)?;
            if job.status != JobStatus::Queued {
                return Err(TransitionError { from: job.status, to: JobStatus::Cancelled }.into());
            }
            Ok(())
        }
    }
}

fn job<'a>(state: &'a MaterializedState, id: &JobId) -> Result<&'a Job, Conflict> {
    state.jobs.get(id.as_str()).ok_or_else(|| Conflict::NotFound(id.clone()))
}

fn slot_holder<'a>(state: &'a MaterializedState, id: &JobId) -> Result<&'a Job, Conflict> {
    let job = job(state, id)?;
    if state.slot.as_ref() != Some(id) {
        if job.is_terminal() {
            // terminal jobs report their status, not a slot mismatch
            return Err(TransitionError { from: job.status, to: job.status }.into());
        }
        return Err(Conflict::NotSlotHolder(id.clone()));
    }
    Ok(job)
}
