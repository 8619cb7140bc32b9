// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job event handlers.

use onejob_core::{Event, Job, JobId, JobStatus, Outcome};

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::JobCreated { id, input_ref, parameters, submitted_at_ms } => {
            if state.jobs.contains_key(id.as_str()) {
                return;
            }
            let position = state.queue_len() as u32;
            let job = Job {
                id: id.clone(),
                status: JobStatus::Queued,
                queue_position: Some(position),
                input_ref: input_ref.clone(),
                parameters: parameters.clone(),
                submitted_at_ms: *submitted_at_ms,
                queued_at_ms: Some(*submitted_at_ms),
                admitted_at_ms: None,
                started_at_ms: None,
                completed_at_ms: None,
                backend_handle: None,
                result: None,
                failure_reason: None,
                dispatch_attempts: 0,
                last_dispatch_error: None,
                cancel_requested: false,
            };
            state.jobs.insert(id.to_string(), job);
        }

        Event::JobAdmitted { id, admitted_at_ms } => {
            if state.slot.as_ref().is_some_and(|holder| holder != id) {
                return;
            }
            let Some(job) = state.jobs.get_mut(id.as_str()) else { return };
            if job.status != JobStatus::Queued {
                return;
            }
            job.status = JobStatus::Pending;
            job.queue_position = None;
            job.admitted_at_ms = Some(*admitted_at_ms);
            state.slot = Some(id.clone());
            renumber(state);
        }

        Event::JobDispatched { id, handle, started_at_ms } => {
            let Some(job) = state.jobs.get_mut(id.as_str()) else { return };
            if !job.is_active() || job.backend_handle.is_some() {
                return;
            }
            job.backend_handle = Some(handle.clone());
            job.started_at_ms.get_or_insert(*started_at_ms);
        }

        Event::JobRequeued { id, error } => {
            let Some(job) = state.jobs.get_mut(id.as_str()) else { return };
            if job.status != JobStatus::Pending || job.backend_handle.is_some() {
                return;
            }
            job.status = JobStatus::Queued;
            job.dispatch_attempts += 1;
            job.last_dispatch_error = Some(error.clone());
            release_slot(state, id);
            // back to the head: everyone else moves down one
            for other in state.jobs.values_mut() {
                if let Some(pos) = other.queue_position.as_mut() {
                    *pos += 1;
                }
            }
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                job.queue_position = Some(0);
            }
            renumber(state);
        }

        Event::JobPhaseChanged { id, status } => {
            let Some(job) = state.jobs.get_mut(id.as_str()) else { return };
            if status.is_active() && job.status.can_transition_to(*status) {
                job.status = *status;
            }
        }

        Event::JobCancelRequested { id } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                if job.is_active() {
                    job.cancel_requested = true;
                }
            }
        }

        Event::JobCompleted { id, outcome, completed_at_ms } => {
            let Some(job) = state.jobs.get_mut(id.as_str()) else { return };
            if !job.is_active() {
                return;
            }
            job.status = outcome.status();
            job.completed_at_ms.get_or_insert(*completed_at_ms);
            match outcome {
                Outcome::Succeeded { artifacts } => job.result = Some(artifacts.clone()),
                Outcome::Failed { reason } => job.failure_reason = Some(reason.clone()),
                Outcome::Cancelled => {}
            }
            release_slot(state, id);
        }

        Event::JobWithdrawn { id, completed_at_ms } => {
            let Some(job) = state.jobs.get_mut(id.as_str()) else { return };
            if job.status != JobStatus::Queued {
                return;
            }
            job.status = JobStatus::Cancelled;
            job.queue_position = None;
            job.completed_at_ms.get_or_insert(*completed_at_ms);
            renumber(state);
        }
    }
}

fn release_slot(state: &mut MaterializedState, id: &JobId) {
    if state.slot.as_ref() == Some(id) {
        state.slot = None;
    }
}

/// Reassign queue positions densely from zero, preserving order.
fn renumber(state: &mut MaterializedState) {
    let order: Vec<String> = state.queue().into_iter().map(|j| j.id.to_string()).collect();
    for (pos, id) in order.iter().enumerate() {
        if let Some(job) = state.jobs.get_mut(id) {
            job.queue_position = Some(pos as u32);
        }
    }
}
