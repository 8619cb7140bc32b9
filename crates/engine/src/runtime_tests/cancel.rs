// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_adapters::BackendCall;
use onejob_core::Outcome;
use yare::parameterized;

#[tokio::test]
async fn cancelling_queued_job_renumbers_the_rest() {
    let ctx = setup();
    let _j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    let j3 = ctx.submit("c").await;
    assert_eq!(ctx.position(&j3.id), Some(1));

    let cancelled = ctx.engine.cancel(j2.id.as_str()).await.unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert_eq!(cancelled.queue_position, None);
    assert!(cancelled.completed_at_ms.is_some());
    assert_eq!(ctx.position(&j3.id), Some(0));
    // Queued cancellation never touches the backend
    assert!(ctx.backend.cancels().is_empty());
    ctx.assert_invariants();
}

#[tokio::test]
async fn cancelling_active_job_waits_for_backend() {
    let mut ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    let handle = ctx.handle_of(&j1.id);

    let view = ctx.engine.cancel(j1.id.as_str()).await.unwrap();
    assert!(view.cancel_requested);
    assert_eq!(view.status, JobStatus::Pending);
    assert_eq!(ctx.backend.cancels(), [handle.clone()]);

    ctx.backend.complete(&handle, Outcome::Cancelled);
    ctx.pump().await;
    assert_eq!(ctx.status(&j1.id), JobStatus::Cancelled);
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
}

#[parameterized(
    failure_becomes_cancelled = { Outcome::Failed { reason: "killed".into() }, JobStatus::Cancelled },
    success_is_kept           = { Outcome::Succeeded { artifacts: vec!["a".into()] }, JobStatus::Succeeded },
    cancelled_is_cancelled    = { Outcome::Cancelled, JobStatus::Cancelled },
)]
#[test_macro(tokio::test)]
async fn outcome_after_cancel_request(outcome: Outcome, expected: JobStatus) {
    let mut ctx = setup();
    let job = ctx.submit("a").await;
    ctx.engine.cancel(job.id.as_str()).await.unwrap();
    ctx.backend.complete(&ctx.handle_of(&job.id), outcome);
    ctx.pump().await;
    assert_eq!(ctx.status(&job.id), expected);
}

#[tokio::test]
async fn cancel_of_lost_backend_job_finalizes_immediately() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    ctx.backend.lose(&ctx.handle_of(&j1.id));

    let view = ctx.engine.cancel(j1.id.as_str()).await.unwrap();
    assert_eq!(view.status, JobStatus::Cancelled);
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
    ctx.assert_invariants();
}

#[tokio::test]
async fn repeated_cancel_of_active_job_requests_once() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    ctx.engine.cancel(job.id.as_str()).await.unwrap();
    ctx.engine.cancel(job.id.as_str()).await.unwrap();

    let (_, lines) = ctx.engine.job_log(job.id.as_str()).unwrap();
    assert_eq!(lines.iter().filter(|l| l.contains("[job:cancel_requested]")).count(), 1);
    // The backend is asked each time; it treats repeats as no-ops
    let cancels = ctx.backend.calls().into_iter().filter(|c| matches!(c, BackendCall::Cancel(_)));
    assert_eq!(cancels.count(), 2);
}

#[tokio::test]
async fn cancelling_terminal_job_is_noop() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    ctx.engine.finalize(&job.id, Outcome::Succeeded { artifacts: vec![] }).await.unwrap();
    let before = ctx.job(&job.id);

    let after = ctx.engine.cancel(job.id.as_str()).await.unwrap();
    assert_eq!(after, before);
    assert!(ctx.backend.cancels().is_empty());
}

#[tokio::test]
async fn cancel_unknown_job_is_not_found() {
    let ctx = setup();
    assert!(matches!(ctx.engine.cancel("job-nope").await, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn cancel_accepts_id_prefix() {
    let ctx = setup();
    ctx.submit("a").await;
    let queued = ctx.submit("b").await;
    let prefix = &queued.id.as_str()[..10];
    let view = ctx.engine.cancel(prefix).await.unwrap();
    assert_eq!(view.id, queued.id);
    assert_eq!(view.status, JobStatus::Cancelled);
}
