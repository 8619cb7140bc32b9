// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::Outcome;

#[tokio::test]
async fn completion_admits_next_in_line() {
    let mut ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    assert_eq!(ctx.position(&j2.id), Some(0));

    ctx.backend.complete(&ctx.handle_of(&j1.id), Outcome::Succeeded { artifacts: vec![] });
    ctx.pump().await;

    assert_eq!(ctx.status(&j1.id), JobStatus::Succeeded);
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
    assert_eq!(ctx.position(&j2.id), None);
    assert_eq!(ctx.handle_of(&j2.id), FakeBackend::handle(1));
    ctx.assert_invariants();
}

#[tokio::test]
async fn submit_failure_returns_job_to_head_and_retries_it_first() {
    let ctx = setup();
    ctx.backend.fail_next_submits(1, "cluster unavailable");
    let j1 = ctx.submit("a").await;

    assert_eq!(j1.status, JobStatus::Queued);
    assert_eq!(j1.queue_position, Some(0));
    assert_eq!(j1.dispatch_attempts, 1);
    assert_eq!(j1.last_dispatch_error.as_deref(), Some("submit failed: cluster unavailable"));
    assert!(ctx.engine.active_job_id().is_none());

    // The next dispatch trigger picks the requeued job ahead of newcomers
    let j2 = ctx.submit("b").await;
    assert_eq!(ctx.status(&j1.id), JobStatus::Pending);
    assert_eq!(ctx.status(&j2.id), JobStatus::Queued);
    assert_eq!(ctx.position(&j2.id), Some(0));
    // Admission timestamp reflects the latest admission
    assert!(ctx.job(&j1.id).admitted_at_ms.is_some());
    ctx.assert_invariants();
}

#[tokio::test]
async fn exhausted_attempts_fail_job_and_move_on() {
    let ctx = setup_with(EngineConfig { max_dispatch_attempts: 2, ..EngineConfig::default() });
    ctx.backend.fail_next_submits(2, "quota exceeded");
    let j1 = ctx.submit("a").await;
    assert_eq!(j1.status, JobStatus::Queued);

    // Second failure exhausts the budget; the dispatcher continues with j2
    let j2 = ctx.submit("b").await;
    let failed = ctx.job(&j1.id);
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("submit failed: quota exceeded"));
    assert!(failed.completed_at_ms.is_some());
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
    ctx.assert_invariants();
}

#[tokio::test]
async fn dispatch_reports_busy_and_idle() {
    let ctx = setup();
    assert_eq!(ctx.engine.dispatch_next().await.unwrap(), DispatchOutcome::Idle);

    let j1 = ctx.submit("a").await;
    ctx.submit("b").await;
    assert_eq!(ctx.engine.dispatch_next().await.unwrap(), DispatchOutcome::Busy { holder: j1.id });
    assert_eq!(ctx.backend.submits().len(), 1);
}

#[tokio::test]
async fn dispatch_is_idempotent_under_repetition() {
    let ctx = setup();
    ctx.submit("a").await;
    for _ in 0..5 {
        ctx.engine.dispatch_next().await.unwrap();
    }
    assert_eq!(ctx.backend.submits().len(), 1);
    ctx.assert_invariants();
}

#[tokio::test]
async fn fifo_order_is_preserved() {
    let mut ctx = setup();
    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(ctx.submit(&format!("in-{i}")).await.id);
    }
    for (n, id) in ids.iter().enumerate() {
        assert_eq!(ctx.engine.active_job_id().as_ref(), Some(id));
        ctx.backend.complete(&FakeBackend::handle(n as u64), Outcome::Succeeded { artifacts: vec![] });
        ctx.pump().await;
    }
    let order: Vec<JobId> = ctx.backend.submits().into_iter().map(|r| r.job_id).collect();
    assert_eq!(order, ids);
}

#[tokio::test]
async fn fifo_order_survives_withdrawal_and_requeue() {
    let mut ctx = setup();
    let a = ctx.submit("a").await.id;
    let b = ctx.submit("b").await.id;
    let c = ctx.submit("c").await.id;
    let d = ctx.submit("d").await.id;

    // Withdraw from the middle of the queue
    ctx.engine.cancel(c.as_str()).await.unwrap();
    assert_eq!(ctx.status(&c), JobStatus::Cancelled);
    assert_eq!((ctx.position(&b), ctx.position(&d)), (Some(0), Some(1)));

    // Next head is refused once and goes back in front of d
    ctx.backend.fail_next_submits(1, "throttled");
    ctx.backend.complete(&FakeBackend::handle(0), Outcome::Succeeded { artifacts: vec![] });
    ctx.pump().await;
    assert_eq!(ctx.status(&b), JobStatus::Queued);
    assert_eq!((ctx.position(&b), ctx.position(&d)), (Some(0), Some(1)));
    ctx.assert_invariants();

    // A newcomer triggers dispatch but queues behind both
    let e = ctx.submit("e").await.id;
    assert_eq!(ctx.engine.active_job_id(), Some(b.clone()));
    assert_eq!(ctx.position(&e), Some(1));

    for n in 1..=3 {
        ctx.backend.complete(&FakeBackend::handle(n), Outcome::Succeeded { artifacts: vec![] });
        ctx.pump().await;
    }
    let order: Vec<JobId> = ctx.backend.submits().into_iter().map(|r| r.job_id).collect();
    assert_eq!(order, [a, b.clone(), b, d, e]);
    ctx.assert_invariants();
}

#[tokio::test]
async fn activity_log_records_transitions() {
    let ctx = setup();
    let job = ctx.submit("uploads/a.xlsx").await;
    let (_, lines) = ctx.engine.job_log(job.id.as_str()).unwrap();
    assert_eq!(lines.len(), 3, "{lines:?}");
    assert!(lines[0].contains("[job:created] submitted input=uploads/a.xlsx"));
    assert!(lines[1].contains("[job:admitted]"));
    assert!(lines[2].contains("[job:dispatched] dispatched to fake as fake-0"));
}
