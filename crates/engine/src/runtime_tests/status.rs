// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_adapters::BackendError;
use onejob_core::{Outcome, Phase, PhaseReport};

#[tokio::test]
async fn queued_job_reports_position() {
    let ctx = setup();
    ctx.submit("a").await;
    let queued = ctx.submit("b").await;

    let view = ctx.engine.status(queued.id.as_str()).await.unwrap();
    assert_eq!(view.status, JobStatus::Queued);
    assert_eq!(view.message, "Queued (position 0)");
    assert_eq!(view.progress_detail, None);
}

#[tokio::test]
async fn live_phase_overlays_without_persisting() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    let handle = ctx.handle_of(&job.id);
    ctx.backend.set_phase(&handle, PhaseReport::new(Phase::Running).detail("iteration 2/3"));

    let view = ctx.engine.status(job.id.as_str()).await.unwrap();
    assert_eq!(view.status, JobStatus::Running);
    assert_eq!(view.message, "Running...");
    assert_eq!(view.progress_detail.as_deref(), Some("iteration 2/3"));
    assert_eq!(ctx.status(&job.id), JobStatus::Pending);
}

#[tokio::test]
async fn live_phase_never_moves_backwards() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    let handle = ctx.handle_of(&job.id);
    ctx.backend.set_phase(&handle, PhaseReport::new(Phase::Running));
    ctx.engine.reconcile().await.unwrap();
    assert_eq!(ctx.status(&job.id), JobStatus::Running);

    ctx.backend.set_phase(&handle, PhaseReport::new(Phase::Starting));
    let view = ctx.engine.status(job.id.as_str()).await.unwrap();
    assert_eq!(view.status, JobStatus::Running);
}

#[tokio::test]
async fn unrecorded_terminal_phase_is_finalized() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    ctx.backend.finish_silently(
        &ctx.handle_of(&j1.id),
        Outcome::Succeeded { artifacts: vec!["out/a.xlsx".into()] },
    );

    let view = ctx.engine.status(j1.id.as_str()).await.unwrap();
    assert_eq!(view.status, JobStatus::Succeeded);
    assert_eq!(view.message, "Completed successfully");
    assert_eq!(view.job.result, Some(vec!["out/a.xlsx".to_string()]));
    assert_eq!(ctx.status(&j2.id), JobStatus::Pending);
}

#[tokio::test]
async fn query_failure_falls_back_to_stored() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    ctx.backend.fail_queries(Some(BackendError::QueryFailed("timeout".into())));

    let view = ctx.engine.status(job.id.as_str()).await.unwrap();
    assert_eq!(view.status, JobStatus::Pending);
    assert_eq!(view.message, "Queued...");
}

#[tokio::test]
async fn status_of_unknown_job_is_not_found() {
    let ctx = setup();
    assert!(matches!(ctx.engine.status("job-x").await, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn results_only_after_success() {
    let mut ctx = setup();
    let job = ctx.submit("a").await;
    let err = ctx.engine.results(job.id.as_str()).unwrap_err();
    assert!(matches!(err, EngineError::NotReady { status: JobStatus::Pending }));

    ctx.backend.complete(
        &ctx.handle_of(&job.id),
        Outcome::Succeeded { artifacts: vec!["r/a.xlsx".into(), "r/a.json".into()] },
    );
    ctx.pump().await;
    let (id, artifacts) = ctx.engine.results(job.id.as_str()).unwrap();
    assert_eq!(id, job.id);
    assert_eq!(artifacts, ["r/a.xlsx", "r/a.json"]);
}

#[tokio::test]
async fn results_of_failed_job_not_ready() {
    let ctx = setup();
    let job = ctx.submit("a").await;
    ctx.engine.finalize(&job.id, Outcome::Failed { reason: "x".into() }).await.unwrap();
    let err = ctx.engine.results(job.id.as_str()).unwrap_err();
    assert!(matches!(err, EngineError::NotReady { status: JobStatus::Failed }));
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    let ctx = setup();
    let a = ctx.submit("a").await;
    let b = ctx.submit("b").await;
    let c = ctx.submit("c").await;

    let ids: Vec<JobId> = ctx.engine.list(Some(2)).into_iter().map(|j| j.id).collect();
    assert_eq!(ids, [c.id.clone(), b.id.clone()]);
    let all: Vec<JobId> = ctx.engine.list(None).into_iter().map(|j| j.id).collect();
    assert_eq!(all, [c.id, b.id, a.id]);
}

#[tokio::test]
async fn summary_counts_slot_and_queue() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    ctx.submit("b").await;
    ctx.submit("c").await;
    let summary = ctx.engine.summary();
    assert_eq!(summary.active, Some(j1.id));
    assert_eq!(summary.queued, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.backend, "fake");
}
