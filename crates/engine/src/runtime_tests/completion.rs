// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::Outcome;

fn succeeded(keys: &[&str]) -> Outcome {
    Outcome::Succeeded { artifacts: keys.iter().map(|k| k.to_string()).collect() }
}

#[tokio::test]
async fn duplicate_notice_changes_state_once() {
    let mut ctx = setup();
    let job = ctx.submit("a").await;
    let handle = ctx.handle_of(&job.id);

    ctx.backend.complete(&handle, succeeded(&["out/a.xlsx"]));
    ctx.backend.complete(&handle, Outcome::Failed { reason: "late".into() });
    let outcomes = ctx.pump().await;

    assert_eq!(
        outcomes,
        [NoticeOutcome::Finalized { id: job.id.clone(), outcome: succeeded(&["out/a.xlsx"]) }, NoticeOutcome::Stale]
    );
    let done = ctx.job(&job.id);
    assert_eq!(done.status, JobStatus::Succeeded);
    assert_eq!(done.result, Some(vec!["out/a.xlsx".to_string()]));
    assert_eq!(done.failure_reason, None);
}

#[tokio::test]
async fn notice_for_unknown_handle_is_stale() {
    let ctx = setup();
    ctx.submit("a").await;
    let notice = CompletionNotice {
        job_id: JobId::from_string("job-nope"),
        handle: "nope".into(),
        outcome: Outcome::Cancelled,
    };
    assert_eq!(ctx.engine.handle_notice(notice).await.unwrap(), NoticeOutcome::Stale);
    ctx.assert_invariants();
}

#[tokio::test]
async fn notice_before_handle_is_recorded_finalizes_by_job_id() {
    let mut ctx = setup();
    ctx.backend.finish_during_submit(succeeded(&["out/a.xlsx"]));
    let gate = ctx.backend.gate_submits();

    let engine = &ctx.engine;
    let notices = &mut ctx.notices;
    let (job, handled) = tokio::join!(
        async { engine.submit("a", Parameters::new()).await.unwrap() },
        async {
            let notice = notices.recv().await.unwrap();
            let handled = engine.handle_notice(notice).await.unwrap();
            gate.notify_one();
            handled
        }
    );

    assert_eq!(handled, NoticeOutcome::Finalized { id: job.id.clone(), outcome: succeeded(&["out/a.xlsx"]) });
    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.result, Some(vec!["out/a.xlsx".to_string()]));
    assert!(ctx.backend.cancels().is_empty());
    assert_eq!(ctx.engine.store().read(|s| s.slot_holder().cloned()), None);
    ctx.assert_invariants();

    // The slot is usable again
    gate.notify_one();
    let next = ctx.submit("b").await;
    assert_eq!(ctx.handle_of(&next.id), FakeBackend::handle(1));
    ctx.assert_invariants();
}

#[tokio::test]
async fn job_id_fallback_ignores_jobs_that_already_have_a_handle() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    let notice = CompletionNotice {
        job_id: job.id.clone(),
        handle: "proc-other".into(),
        outcome: Outcome::Failed { reason: "stray".into() },
    };
    assert_eq!(ctx.engine.handle_notice(notice).await.unwrap(), NoticeOutcome::Stale);
    assert!(ctx.job(&job.id).is_active());
}

#[tokio::test]
async fn failure_records_reason_and_frees_slot() {
    let mut ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    ctx.backend.complete(&ctx.handle_of(&j1.id), Outcome::Failed { reason: "infeasible".into() });
    ctx.pump().await;

    let failed = ctx.job(&j1.id);
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("infeasible"));
    assert_eq!(failed.display_message(), "Failed: infeasible");
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
}

#[tokio::test]
async fn external_completion_by_handle_or_id() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;

    let by_handle = ctx
        .engine
        .complete_external(FakeBackend::handle(0).as_str(), succeeded(&["x"]))
        .await
        .unwrap();
    assert!(matches!(by_handle, NoticeOutcome::Finalized { ref id, .. } if *id == j1.id));

    let by_id = ctx
        .engine
        .complete_external(j2.id.as_str(), Outcome::Failed { reason: "oom".into() })
        .await
        .unwrap();
    assert!(matches!(by_id, NoticeOutcome::Finalized { ref id, .. } if *id == j2.id));
    assert_eq!(ctx.status(&j2.id), JobStatus::Failed);
}

#[tokio::test]
async fn external_completion_for_queued_job_is_stale() {
    let ctx = setup();
    ctx.submit("a").await;
    let queued = ctx.submit("b").await;
    let result = ctx.engine.complete_external(queued.id.as_str(), succeeded(&[])).await.unwrap();
    assert_eq!(result, NoticeOutcome::Stale);
    assert_eq!(ctx.status(&queued.id), JobStatus::Queued);
}

#[tokio::test]
async fn external_completion_for_unknown_target_is_not_found() {
    let ctx = setup();
    let err = ctx.engine.complete_external("job-missing", Outcome::Cancelled).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn terminal_record_is_never_rewritten() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    ctx.engine.finalize(&job.id, succeeded(&["a"])).await.unwrap();
    let done = ctx.job(&job.id);

    ctx.clock.advance(Duration::from_secs(60));
    let again = ctx.engine.finalize(&job.id, Outcome::Cancelled).await.unwrap();
    assert_eq!(again, NoticeOutcome::Stale);
    assert_eq!(ctx.job(&job.id), done);
}
