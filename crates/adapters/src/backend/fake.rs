// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory backend for engine tests.

use super::{BackendError, CompletionNotice, ComputeBackend, SubmitRequest};
use async_trait::async_trait;
use onejob_core::{BackendHandle, JobId, Outcome, Phase, PhaseReport};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Submit(SubmitRequest),
    Cancel(BackendHandle),
}

#[derive(Default)]
struct State {
    calls: Vec<BackendCall>,
    next_handle: u64,
    submit_failures: VecDeque<String>,
    query_failure: Option<BackendError>,
    reports: HashMap<BackendHandle, PhaseReport>,
    notices: HashMap<BackendHandle, mpsc::Sender<CompletionNotice>>,
    jobs: HashMap<BackendHandle, JobId>,
    /// Cancel marks the job cancelled and pushes a notice immediately.
    complete_on_cancel: bool,
    /// Submits accept the job, then wait here before returning the handle.
    gate: Option<Arc<Notify>>,
    /// Outcome pushed by the next submit before it returns.
    finish_during_submit: Option<Outcome>,
}

/// Scriptable backend. Submitted jobs sit in `Starting` until a test moves
/// them with [`FakeBackend::set_phase`] or [`FakeBackend::complete`].
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` submits fail with `reason`.
    pub fn fail_next_submits(&self, n: usize, reason: &str) {
        let mut state = self.inner.lock();
        state.submit_failures.extend((0..n).map(|_| reason.to_string()));
    }

    /// Make every query fail with `err` until cleared with `None`.
    pub fn fail_queries(&self, err: Option<BackendError>) {
        self.inner.lock().query_failure = err;
    }

    pub fn complete_on_cancel(&self, enabled: bool) {
        self.inner.lock().complete_on_cancel = enabled;
    }

    /// Hold every later submit after the job is accepted until the returned
    /// gate is notified. Each `notify_one` releases one submit.
    pub fn gate_submits(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner.lock().gate = Some(Arc::clone(&gate));
        gate
    }

    /// The next submitted job finishes with `outcome` before its submit
    /// call returns.
    pub fn finish_during_submit(&self, outcome: Outcome) {
        self.inner.lock().finish_during_submit = Some(outcome);
    }

    pub fn set_phase(&self, handle: &BackendHandle, report: PhaseReport) {
        self.inner.lock().reports.insert(handle.clone(), report);
    }

    /// Mark the job terminal and push a completion notice.
    pub fn complete(&self, handle: &BackendHandle, outcome: Outcome) {
        let target = {
            let mut state = self.inner.lock();
            state.reports.insert(handle.clone(), report_for(&outcome));
            state.notices.get(handle).cloned().zip(state.jobs.get(handle).cloned())
        };
        if let Some((sender, job_id)) = target {
            let _ = sender.try_send(CompletionNotice { job_id, handle: handle.clone(), outcome });
        }
    }

    /// Mark the job terminal without pushing a notice (a lost push).
    pub fn finish_silently(&self, handle: &BackendHandle, outcome: Outcome) {
        self.inner.lock().reports.insert(handle.clone(), report_for(&outcome));
    }

    /// Forget the job, as if the backend lost track of it.
    pub fn lose(&self, handle: &BackendHandle) {
        let mut state = self.inner.lock();
        state.reports.remove(handle);
        state.notices.remove(handle);
        state.jobs.remove(handle);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    pub fn submits(&self) -> Vec<SubmitRequest> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Submit(r) => Some(r.clone()),
                BackendCall::Cancel(_) => None,
            })
            .collect()
    }

    pub fn cancels(&self) -> Vec<BackendHandle> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Cancel(h) => Some(h.clone()),
                BackendCall::Submit(_) => None,
            })
            .collect()
    }

    /// Handle issued for the `n`th successful submit (zero-based).
    pub fn handle(n: u64) -> BackendHandle {
        BackendHandle::new(format!("fake-{n}"))
    }
}

fn report_for(outcome: &Outcome) -> PhaseReport {
    match outcome {
        Outcome::Succeeded { artifacts } => {
            PhaseReport::new(Phase::Succeeded).artifacts(artifacts.clone())
        }
        Outcome::Failed { reason } => PhaseReport::new(Phase::Failed).reason(reason.clone()),
        Outcome::Cancelled => PhaseReport::new(Phase::Cancelled),
    }
}

#[async_trait]
impl ComputeBackend for FakeBackend {
    async fn submit(
        &self,
        request: &SubmitRequest,
        notices: mpsc::Sender<CompletionNotice>,
    ) -> Result<BackendHandle, BackendError> {
        // Give concurrent callers a chance to interleave
        tokio::task::yield_now().await;
        let (handle, gate, finished) = {
            let mut state = self.inner.lock();
            state.calls.push(BackendCall::Submit(request.clone()));
            if let Some(reason) = state.submit_failures.pop_front() {
                return Err(BackendError::SubmitFailed(reason));
            }
            let handle = Self::handle(state.next_handle);
            state.next_handle += 1;
            state.reports.insert(handle.clone(), PhaseReport::new(Phase::Starting));
            state.notices.insert(handle.clone(), notices);
            state.jobs.insert(handle.clone(), request.job_id.clone());
            (handle, state.gate.clone(), state.finish_during_submit.take())
        };
        if let Some(outcome) = finished {
            self.complete(&handle, outcome);
        }
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(handle)
    }

    async fn query_phase(&self, handle: &BackendHandle) -> Result<PhaseReport, BackendError> {
        let state = self.inner.lock();
        if let Some(err) = &state.query_failure {
            return Err(err.clone());
        }
        state
            .reports
            .get(handle)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(handle.to_string()))
    }

    async fn cancel(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        let complete = {
            let mut state = self.inner.lock();
            state.calls.push(BackendCall::Cancel(handle.clone()));
            if !state.reports.contains_key(handle) {
                return Err(BackendError::NotFound(handle.to_string()));
            }
            state.complete_on_cancel
        };
        if complete {
            self.complete(handle, Outcome::Cancelled);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
