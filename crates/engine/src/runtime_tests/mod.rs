// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod cancel;
mod completion;
mod dispatch;
mod properties;
mod reconcile;
mod status;
mod submit;

use super::*;
use onejob_adapters::FakeBackend;
use onejob_core::{BackendHandle, FakeClock, JobId, JobStatus, Parameters};
use std::time::Duration;

struct TestContext {
    engine: Engine<FakeBackend, FakeClock>,
    backend: FakeBackend,
    clock: FakeClock,
    notices: mpsc::Receiver<CompletionNotice>,
    _dir: tempfile::TempDir,
}

fn setup() -> TestContext {
    setup_with(EngineConfig::default())
}

fn setup_with(config: EngineConfig) -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    let clock = FakeClock::new();
    let (tx, rx) = mpsc::channel(64);
    let engine = Engine::new(JobStore::in_memory(), backend.clone(), clock.clone(), config, tx)
        .with_job_logger(JobLogger::new(dir.path().join("logs")));
    TestContext { engine, backend, clock, notices: rx, _dir: dir }
}

impl TestContext {
    async fn submit(&self, input: &str) -> Job {
        // Distinct submission times keep newest-first ordering deterministic
        self.clock.advance(Duration::from_millis(10));
        self.engine.submit(input, Parameters::new()).await.unwrap()
    }

    fn job(&self, id: &JobId) -> Job {
        self.engine.store().get_job(id.as_str()).unwrap()
    }

    fn handle_of(&self, id: &JobId) -> BackendHandle {
        self.job(id).backend_handle.unwrap()
    }

    /// Feed every pushed notice back into the engine.
    async fn pump(&mut self) -> Vec<NoticeOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            outcomes.push(self.engine.handle_notice(notice).await.unwrap());
        }
        outcomes
    }

    fn assert_invariants(&self) {
        self.engine.store().read(|s| s.check_invariants()).unwrap();
    }

    fn position(&self, id: &JobId) -> Option<u32> {
        self.job(id).queue_position
    }

    fn status(&self, id: &JobId) -> JobStatus {
        self.job(id).status
    }
}
