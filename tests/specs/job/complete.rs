// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation and external completion specs

use crate::prelude::*;

const SLOW_WORKER: &str = "sleep 5\n";

#[test]
fn external_completion_finalizes_running_job() {
    let temp = Sandbox::with_worker(SLOW_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();
    let id = temp.submit("uploads/plan.xlsx");

    temp.onejob()
        .args(&["job", "complete", &id, "--succeeded", "--artifact", "out/plan.xlsx"])
        .passes();

    assert_eq!(temp.status_of(&id), "SUCCEEDED");
    temp.onejob().args(&["results", &id]).passes().stdout_has("out/plan.xlsx");
}

#[test]
fn queued_job_cancels_immediately() {
    let temp = Sandbox::with_worker(SLOW_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();
    temp.submit("uploads/a.xlsx");
    let queued = temp.submit("uploads/b.xlsx");

    temp.onejob().args(&["cancel", &queued]).passes().stdout_has("Cancelled");
    assert_eq!(temp.status_of(&queued), "CANCELLED");
}

#[test]
fn cancelling_running_job_frees_the_slot() {
    let temp = Sandbox::with_worker(SLOW_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();
    let running = temp.submit("uploads/a.xlsx");
    let next = temp.submit("uploads/b.xlsx");

    temp.onejob().args(&["cancel", &running]).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&running) == "CANCELLED"));
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&next) != "QUEUED"));
}
