// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine runtime
//!
//! The engine holds no record of which job is current between calls. Every
//! decision is read from the store, and every mutation goes through
//! [`JobStore::commit`], which refuses events whose preconditions no longer
//! hold. Two callers racing for the execution slot therefore resolve to one
//! winner at the store, never in engine memory.

mod cancel;
mod completion;
mod dispatch;
mod query;
mod reconcile;
mod submit;

pub use completion::NoticeOutcome;
pub use dispatch::DispatchOutcome;
pub use query::{EngineSummary, JobView};

use crate::error::EngineError;
use crate::job_logger::JobLogger;
use onejob_adapters::{CompletionNotice, ComputeBackend};
use onejob_core::{Clock, Event, Job};
use onejob_storage::{Commit, JobStore};
use tokio::sync::mpsc;

/// Tunables for dispatch and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Failed backend submissions after which a job is finalized `FAILED`.
    pub max_dispatch_attempts: u32,
    /// Age after which an admission with no backend handle is presumed
    /// abandoned and requeued by reconciliation.
    pub stale_admission_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_dispatch_attempts: 3, stale_admission_ms: 120_000 }
    }
}

/// Single-slot job orchestrator.
pub struct Engine<B: ComputeBackend, C: Clock> {
    store: JobStore,
    backend: B,
    clock: C,
    config: EngineConfig,
    notices: mpsc::Sender<CompletionNotice>,
    logger: Option<JobLogger>,
}

impl<B, C> Engine<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    /// Completion notices from the backend arrive on the receiving end of
    /// `notices`; the owner feeds them back through [`Engine::handle_notice`].
    pub fn new(
        store: JobStore,
        backend: B,
        clock: C,
        config: EngineConfig,
        notices: mpsc::Sender<CompletionNotice>,
    ) -> Self {
        Self { store, backend, clock, config, notices, logger: None }
    }

    pub fn with_job_logger(mut self, logger: JobLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Look up a job by ID or unique prefix.
    fn require_job(&self, id: &str) -> Result<Job, EngineError> {
        self.store.get_job(id).ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Commit an event and mirror applied events into the job's activity log.
    fn commit(&self, event: Event, message: impl FnOnce() -> String) -> Result<Commit, EngineError> {
        let id = event.job_id().clone();
        let step = event.name();
        let result = self.store.commit(event)?;
        if result.is_applied() {
            if let Some(logger) = &self.logger {
                logger.append(id.as_str(), step, &message());
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
