// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local process backend.
//!
//! Each job runs as a child process of the daemon. The worker reports over
//! stdout, one directive per line:
//!
//! - `artifact <key>` adds an output artifact key
//! - `progress <text>` replaces the progress detail
//!
//! Every other line is ignored. Exit status 0 is success; anything else is a
//! failure carrying the exit status and the last stderr line.

use super::{BackendError, CompletionNotice, ComputeBackend, SubmitRequest};
use async_trait::async_trait;
use onejob_core::{BackendHandle, JobId, Outcome, Phase, PhaseReport};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Finished runs kept queryable after their notice went out.
pub const DEFAULT_RETAINED_RUNS: usize = 64;

#[derive(Clone)]
pub struct ProcessBackend {
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    retain: usize,
    runs: Arc<Mutex<RunTable>>,
}

struct Run {
    report: PhaseReport,
    cancel: CancellationToken,
}

/// Live runs plus a bounded tail of finished ones, oldest first.
#[derive(Default)]
struct RunTable {
    runs: HashMap<BackendHandle, Run>,
    finished: VecDeque<BackendHandle>,
}

impl RunTable {
    fn retire(&mut self, handle: &BackendHandle, retain: usize) {
        self.finished.push_back(handle.clone());
        while self.finished.len() > retain {
            if let Some(old) = self.finished.pop_front() {
                self.runs.remove(&old);
            }
        }
    }
}

impl ProcessBackend {
    /// Backend that launches `program` with `args` for every job.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
            retain: DEFAULT_RETAINED_RUNS,
            runs: Arc::new(Mutex::new(RunTable::default())),
        }
    }

    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Result<Self, BackendError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| BackendError::Unavailable("empty worker command".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Run workers in `dir` instead of the daemon's working directory.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Keep at most `n` finished runs; older ones answer `NotFound`.
    pub fn with_retention(mut self, n: usize) -> Self {
        self.retain = n;
        self
    }

    fn update(&self, handle: &BackendHandle, f: impl FnOnce(&mut PhaseReport)) {
        if let Some(run) = self.runs.lock().runs.get_mut(handle) {
            f(&mut run.report);
        }
    }

    async fn watch(
        self,
        job_id: JobId,
        handle: BackendHandle,
        mut child: Child,
        cancel: CancellationToken,
        notices: mpsc::Sender<CompletionNotice>,
    ) {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let reader = {
            let backend = self.clone();
            let handle = handle.clone();
            tokio::spawn(async move {
                let Some(stdout) = stdout else { return };
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    backend.apply_directive(&handle, &line);
                }
            })
        };
        let last_stderr = tokio::spawn(async move {
            let mut last = None;
            let Some(stderr) = stderr else { return last };
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.trim().is_empty() {
                    last = Some(line);
                }
            }
            last
        });

        let outcome = tokio::select! {
            status = child.wait() => {
                // Drain stdout so every artifact line is recorded
                let _ = reader.await;
                let stderr_tail = last_stderr.await.ok().flatten();
                self.exit_outcome(&handle, status, stderr_tail)
            }
            _ = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(%handle, error = %e, "failed to kill worker");
                }
                Outcome::Cancelled
            }
        };

        let phase = match &outcome {
            Outcome::Succeeded { .. } => Phase::Succeeded,
            Outcome::Failed { reason } => {
                let reason = reason.clone();
                self.update(&handle, |r| r.reason = Some(reason));
                Phase::Failed
            }
            Outcome::Cancelled => Phase::Cancelled,
        };
        {
            let mut table = self.runs.lock();
            if let Some(run) = table.runs.get_mut(&handle) {
                run.report.phase = phase;
            }
            table.retire(&handle, self.retain);
        }
        tracing::info!(%handle, %outcome, "worker exited");

        if notices.send(CompletionNotice { job_id, handle, outcome }).await.is_err() {
            tracing::debug!("completion receiver dropped");
        }
    }

    fn apply_directive(&self, handle: &BackendHandle, line: &str) {
        if let Some(key) = line.strip_prefix("artifact ") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.update(handle, |r| r.artifacts.push(key));
            }
        } else if let Some(text) = line.strip_prefix("progress ") {
            let text = text.trim().to_string();
            self.update(handle, |r| r.detail = Some(text));
        }
    }

    fn exit_outcome(
        &self,
        handle: &BackendHandle,
        status: std::io::Result<ExitStatus>,
        stderr_tail: Option<String>,
    ) -> Outcome {
        match status {
            Ok(status) if status.success() => {
                let artifacts = self
                    .runs
                    .lock()
                    .runs
                    .get(handle)
                    .map(|run| run.report.artifacts.clone())
                    .unwrap_or_default();
                Outcome::Succeeded { artifacts }
            }
            Ok(status) => {
                let mut reason = match status.code() {
                    Some(code) => format!("worker exited with status {code}"),
                    None => "worker terminated by signal".to_string(),
                };
                if let Some(tail) = stderr_tail {
                    reason.push_str(": ");
                    reason.push_str(&tail);
                }
                Outcome::Failed { reason }
            }
            Err(e) => Outcome::Failed { reason: format!("failed to wait for worker: {e}") },
        }
    }
}

#[async_trait]
impl ComputeBackend for ProcessBackend {
    async fn submit(
        &self,
        request: &SubmitRequest,
        notices: mpsc::Sender<CompletionNotice>,
    ) -> Result<BackendHandle, BackendError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(request.worker_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| {
            BackendError::SubmitFailed(format!("failed to spawn {}: {e}", self.program))
        })?;

        let handle = BackendHandle::new(format!("proc-{}", uuid::Uuid::new_v4()));
        let cancel = CancellationToken::new();
        self.runs.lock().runs.insert(
            handle.clone(),
            Run { report: PhaseReport::new(Phase::Running), cancel: cancel.clone() },
        );

        tracing::info!(
            job_id = %request.job_id,
            %handle,
            name = %request.backend_name(),
            pid = child.id(),
            "worker started"
        );

        let job_id = request.job_id.clone();
        tokio::spawn(self.clone().watch(job_id, handle.clone(), child, cancel, notices));
        Ok(handle)
    }

    async fn query_phase(&self, handle: &BackendHandle) -> Result<PhaseReport, BackendError> {
        self.runs
            .lock()
            .runs
            .get(handle)
            .map(|run| run.report.clone())
            .ok_or_else(|| BackendError::NotFound(handle.to_string()))
    }

    async fn cancel(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        let table = self.runs.lock();
        let run =
            table.runs.get(handle).ok_or_else(|| BackendError::NotFound(handle.to_string()))?;
        if !run.report.phase.is_terminal() {
            run.cancel.cancel();
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
