// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_adapters::BackendError;
use onejob_core::{Outcome, Phase, PhaseReport};

#[tokio::test]
async fn reconcile_finalizes_lost_push() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    ctx.backend.finish_silently(&ctx.handle_of(&j1.id), Outcome::Succeeded { artifacts: vec![] });

    let outcome = ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.status(&j1.id), JobStatus::Succeeded);
    assert!(matches!(outcome, DispatchOutcome::Dispatched { ref id, .. } if *id == j2.id));
    ctx.assert_invariants();
}

#[tokio::test]
async fn reconcile_records_forward_progress() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    let handle = ctx.handle_of(&job.id);

    ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.status(&job.id), JobStatus::Starting);

    ctx.backend.set_phase(&handle, PhaseReport::new(Phase::Running));
    ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.status(&job.id), JobStatus::Running);
}

#[tokio::test]
async fn reconcile_fails_job_the_backend_forgot() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    ctx.backend.lose(&ctx.handle_of(&j1.id));

    ctx.engine.reconcile().await.unwrap();
    let lost = ctx.job(&j1.id);
    assert_eq!(lost.status, JobStatus::Failed);
    assert_eq!(lost.failure_reason.as_deref(), Some("backend lost track of job"));
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
}

#[tokio::test]
async fn reconcile_tolerates_query_errors() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    ctx.backend.fail_queries(Some(BackendError::Unavailable("apiserver down".into())));

    ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.status(&job.id), JobStatus::Pending);
    assert_eq!(ctx.engine.active_job_id(), Some(job.id));
}

#[tokio::test]
async fn reconcile_retries_requeued_job() {
    let ctx = setup();
    ctx.backend.fail_next_submits(1, "busy");
    let job = ctx.submit("a").await;
    assert_eq!(job.status, JobStatus::Queued);

    ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.status(&job.id), JobStatus::Pending);
    assert_eq!(ctx.backend.submits().len(), 2);
}

fn admit_without_dispatch(ctx: &TestContext, input: &str) -> JobId {
    let id = JobId::from_string(format!("job-{input}"));
    let store = ctx.engine.store();
    store
        .commit(Event::JobCreated {
            id: id.clone(),
            input_ref: input.to_string(),
            parameters: Parameters::new(),
            submitted_at_ms: ctx.clock.epoch_ms(),
        })
        .unwrap();
    store.commit(Event::JobAdmitted { id: id.clone(), admitted_at_ms: ctx.clock.epoch_ms() }).unwrap();
    id
}

#[tokio::test]
async fn stale_admission_requeued_after_threshold() {
    let ctx = setup();
    let id = admit_without_dispatch(&ctx, "stuck");

    ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.job(&id).backend_handle, None, "fresh admission left alone");

    ctx.clock.advance(Duration::from_millis(EngineConfig::default().stale_admission_ms));
    ctx.engine.reconcile().await.unwrap();
    let job = ctx.job(&id);
    assert_eq!(job.dispatch_attempts, 1);
    assert_eq!(job.backend_handle, Some(FakeBackend::handle(0)));
    ctx.assert_invariants();
}

#[tokio::test]
async fn recover_requeues_orphaned_admission_immediately() {
    let ctx = setup();
    let id = admit_without_dispatch(&ctx, "orphan");

    ctx.engine.recover().await.unwrap();
    let job = ctx.job(&id);
    assert_eq!(job.last_dispatch_error.as_deref(), Some("daemon restarted before dispatch"));
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.backend_handle.is_some());
}

#[tokio::test]
async fn recover_cancels_orphan_that_was_being_cancelled() {
    let ctx = setup();
    let id = admit_without_dispatch(&ctx, "doomed");
    ctx.engine.store().commit(Event::JobCancelRequested { id: id.clone() }).unwrap();

    ctx.engine.recover().await.unwrap();
    assert_eq!(ctx.status(&id), JobStatus::Cancelled);
    assert!(ctx.backend.submits().is_empty());
}
