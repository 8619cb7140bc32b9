// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

mod check;
mod helpers;
mod jobs;

pub use check::Conflict;

use onejob_core::{BackendHandle, Event, Job, JobId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Job table plus the singleton execution slot.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<String, Job>,
    /// Job currently holding the execution slot.
    #[serde(default)]
    pub slot: Option<JobId>,
}

impl MaterializedState {
    /// Get a job by ID or unique prefix (like git commit hashes)
    pub fn get_job(&self, id: &str) -> Option<&Job> {
        helpers::find_by_prefix(&self.jobs, id)
    }

    pub fn slot_holder(&self) -> Option<&JobId> {
        self.slot.as_ref()
    }

    /// The job holding the execution slot.
    pub fn active_job(&self) -> Option<&Job> {
        self.slot.as_ref().and_then(|id| self.jobs.get(id.as_str()))
    }

    pub fn job_by_handle(&self, handle: &BackendHandle) -> Option<&Job> {
        self.jobs.values().find(|j| j.backend_handle.as_ref() == Some(handle))
    }

    /// Queued jobs in admission order.
    pub fn queue(&self) -> Vec<&Job> {
        let mut queued: Vec<&Job> =
            self.jobs.values().filter(|j| j.queue_position.is_some()).collect();
        queued.sort_by(|a, b| queue_order(a).cmp(&queue_order(b)));
        queued
    }

    pub fn queue_head(&self) -> Option<&Job> {
        self.jobs.values().filter(|j| j.queue_position.is_some()).min_by_key(|j| queue_order(*j))
    }

    pub fn queue_len(&self) -> usize {
        self.jobs.values().filter(|j| j.queue_position.is_some()).count()
    }

    /// Jobs ordered newest submission first, optionally truncated.
    pub fn jobs_newest_first(&self, limit: Option<usize>) -> Vec<&Job> {
        let mut all: Vec<&Job> = self.jobs.values().collect();
        all.sort_by(|a, b| {
            b.submitted_at_ms.cmp(&a.submitted_at_ms).then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = limit {
            all.truncate(limit);
        }
        all
    }

    /// Check whether `event` may be applied to the current state.
    ///
    /// A rejection means the precondition the caller observed no longer
    /// holds; applying the event anyway would be a no-op at best.
    pub fn check(&self, event: &Event) -> Result<(), Conflict> {
        check::check(self, event)
    }

    /// Apply an event to derive state changes.
    ///
    /// Handlers are idempotent: applying an event a second time in a row
    /// leaves the state unchanged. Each handler is guarded by the status it
    /// transitions from.
    pub fn apply_event(&mut self, event: &Event) {
        jobs::apply(self, event)
    }

    /// Verify the structural invariants of the job table.
    ///
    /// At most one active job, which must be the slot holder; queue positions
    /// dense from zero; only queued jobs carry a position.
    #[cfg(any(test, feature = "test-support"))]
    pub fn check_invariants(&self) -> Result<(), String> {
        let active: Vec<&Job> = self.jobs.values().filter(|j| j.is_active()).collect();
        if active.len() > 1 {
            return Err(format!("{} active jobs", active.len()));
        }
        match (active.first(), &self.slot) {
            (Some(job), Some(holder)) if job.id == *holder => {}
            (None, None) => {}
            (job, holder) => {
                return Err(format!(
                    "slot {:?} does not match active job {:?}",
                    holder,
                    job.map(|j| &j.id)
                ))
            }
        }
        let mut positions: Vec<u32> = Vec::new();
        for job in self.jobs.values() {
            match (job.status, job.queue_position) {
                (onejob_core::JobStatus::Queued, Some(pos)) => positions.push(pos),
                (onejob_core::JobStatus::Queued, None) => {
                    return Err(format!("queued job {} has no position", job.id))
                }
                (_, Some(_)) => return Err(format!("non-queued job {} has a position", job.id)),
                (_, None) => {}
            }
        }
        positions.sort_unstable();
        if positions.iter().enumerate().any(|(i, p)| *p as usize != i) {
            return Err(format!("queue positions not dense: {positions:?}"));
        }
        Ok(())
    }
}

fn queue_order(job: &Job) -> (u32, u64, &str) {
    (job.queue_position.unwrap_or(u32::MAX), job.queued_at_ms.unwrap_or(u64::MAX), job.id.as_str())
}

#[cfg(test)]
#[path = "../state_tests.rs"]
mod tests;
