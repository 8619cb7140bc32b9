// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::ValidationError;
use std::sync::Arc;

#[tokio::test]
async fn submit_with_free_slot_dispatches_immediately() {
    let ctx = setup();
    let job = ctx.submit("uploads/a.xlsx").await;

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.queue_position, None);
    assert_eq!(job.backend_handle, Some(FakeBackend::handle(0)));
    assert!(job.started_at_ms.is_some());
    assert_eq!(ctx.engine.store().read(|s| s.slot_holder().cloned()), Some(job.id.clone()));

    let submits = ctx.backend.submits();
    assert_eq!(submits.len(), 1);
    assert_eq!(submits[0].job_id, job.id);
    assert_eq!(submits[0].input_ref, "uploads/a.xlsx");
    assert!(submits[0].env.contains(&("MAX_ITERATIONS".to_string(), "3".to_string())));
    ctx.assert_invariants();
}

#[tokio::test]
async fn submit_with_slot_held_queues_at_tail() {
    let ctx = setup();
    let j1 = ctx.submit("a").await;
    let j2 = ctx.submit("b").await;
    let j3 = ctx.submit("c").await;

    assert_eq!(ctx.status(&j1.id), JobStatus::Pending);
    assert_eq!((j2.status, j2.queue_position), (JobStatus::Queued, Some(0)));
    assert_eq!((j3.status, j3.queue_position), (JobStatus::Queued, Some(1)));
    assert_eq!(j3.queued_at_ms, Some(j3.submitted_at_ms));
    assert_eq!(ctx.backend.submits().len(), 1);
    ctx.assert_invariants();
}

#[tokio::test]
async fn invalid_parameters_create_no_record() {
    let ctx = setup();
    let params = Parameters::new().with("maxIterations", 0);
    let err = ctx.engine.submit("uploads/a.xlsx", params).await.unwrap_err();

    assert!(matches!(err, EngineError::Validation(ValidationError::OutOfRange { .. })), "{err:?}");
    assert!(ctx.engine.list(None).is_empty());
    assert!(ctx.backend.calls().is_empty());
}

#[tokio::test]
async fn empty_input_ref_is_rejected() {
    let ctx = setup();
    let err = ctx.engine.submit("  ", Parameters::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    assert!(ctx.engine.list(None).is_empty());
}

#[tokio::test]
async fn parameters_stored_as_sent_and_sent_effective() {
    let ctx = setup();
    let params = Parameters::new().with("minUtilization", 0.5);
    let job = ctx.engine.submit("a", params.clone()).await.unwrap();

    assert_eq!(job.parameters, params);
    let env = &ctx.backend.submits()[0].env;
    assert!(env.contains(&("MIN_UTILIZATION".to_string(), "0.5".to_string())));
    assert!(env.contains(&("MAX_UTILIZATION".to_string(), "1.15".to_string())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_admit_exactly_one() {
    const N: usize = 12;
    let ctx = setup();
    let engine = Arc::new(ctx.engine);

    let tasks: Vec<_> = (0..N)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine.submit(&format!("uploads/{i}.xlsx"), Parameters::new()).await.unwrap()
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let jobs = engine.list(None);
    assert_eq!(jobs.len(), N);
    let active: Vec<_> = jobs.iter().filter(|j| j.is_active()).collect();
    assert_eq!(active.len(), 1);
    let mut positions: Vec<u32> = jobs.iter().filter_map(|j| j.queue_position).collect();
    positions.sort_unstable();
    assert_eq!(positions, (0..(N as u32 - 1)).collect::<Vec<_>>());
    assert_eq!(ctx.backend.submits().len(), 1);
    engine.store().read(|s| s.check_invariants()).unwrap();
}
