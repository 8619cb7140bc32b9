// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Random operation sequences against the fake backend.

use super::*;
use onejob_core::test_support::strategies::arb_outcome;
use onejob_core::Outcome;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Submit,
    FailNextSubmit,
    Complete(Outcome),
    CompleteSilently(Outcome),
    Cancel(usize),
    LoseActive,
    Reconcile,
    Redeliver,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Submit),
        1 => Just(Op::FailNextSubmit),
        3 => arb_outcome().prop_map(Op::Complete),
        1 => arb_outcome().prop_map(Op::CompleteSilently),
        2 => any::<usize>().prop_map(Op::Cancel),
        1 => Just(Op::LoseActive),
        2 => Just(Op::Reconcile),
        1 => Just(Op::Redeliver),
    ]
}

fn active_handle(ctx: &TestContext) -> Option<BackendHandle> {
    ctx.engine.store().read(|s| s.active_job().and_then(|j| j.backend_handle.clone()))
}

async fn apply(ctx: &mut TestContext, op: Op, last_notice: &mut Option<CompletionNotice>) {
    match op {
        Op::Submit => {
            ctx.submit("uploads/in.xlsx").await;
        }
        Op::FailNextSubmit => ctx.backend.fail_next_submits(1, "flaky"),
        Op::Complete(outcome) => {
            if let Some(handle) = active_handle(ctx) {
                ctx.backend.complete(&handle, outcome);
            }
        }
        Op::CompleteSilently(outcome) => {
            if let Some(handle) = active_handle(ctx) {
                ctx.backend.finish_silently(&handle, outcome);
            }
        }
        Op::Cancel(pick) => {
            let jobs = ctx.engine.list(None);
            if !jobs.is_empty() {
                let id = jobs[pick % jobs.len()].id.clone();
                ctx.engine.cancel(id.as_str()).await.unwrap();
            }
        }
        Op::LoseActive => {
            if let Some(handle) = active_handle(ctx) {
                ctx.backend.lose(&handle);
            }
        }
        Op::Reconcile => {
            ctx.engine.reconcile().await.unwrap();
        }
        Op::Redeliver => {
            if let Some(notice) = last_notice.clone() {
                ctx.engine.handle_notice(notice).await.unwrap();
            }
        }
    }
    while let Ok(notice) = ctx.notices.try_recv() {
        *last_notice = Some(notice.clone());
        ctx.engine.handle_notice(notice).await.unwrap();
    }
}

fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async move {
        let mut ctx = setup();
        let mut terminal: HashMap<JobId, Job> = HashMap::new();
        let mut last_notice = None;

        for op in ops {
            apply(&mut ctx, op, &mut last_notice).await;

            ctx.engine.store().read(|s| s.check_invariants()).map_err(TestCaseError::fail)?;
            for job in ctx.engine.list(None) {
                match terminal.get(&job.id) {
                    Some(frozen) => {
                        prop_assert_eq!(frozen, &job);
                    }
                    None if job.is_terminal() => {
                        terminal.insert(job.id.clone(), job);
                    }
                    None => {}
                }
            }
        }
        Ok(())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_for_any_operation_sequence(ops in proptest::collection::vec(arb_op(), 1..40)) {
        run(ops)?;
    }
}
