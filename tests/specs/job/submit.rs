// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission, status and results specs

use crate::prelude::*;

const REPORTING_WORKER: &str = "\
echo \"progress optimizing $INPUT_REF\"
echo \"artifact out/${JOB_ID}/plan.xlsx\"
";

const FAILING_WORKER: &str = "\
echo 'no sheet named Demand' >&2
exit 3
";

#[test]
fn submitted_job_runs_to_success_and_exposes_results() {
    let temp = Sandbox::with_worker(REPORTING_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    let id = temp.submit("uploads/plan.xlsx");
    let done = wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&id) == "SUCCEEDED");
    if !done {
        eprintln!("=== DAEMON LOG ===\n{}\n=== END LOG ===", temp.daemon_log());
    }
    assert!(done, "job should succeed");

    temp.onejob()
        .args(&["status", &id])
        .passes()
        .stdout_has("succeeded")
        .stdout_has("Completed successfully");
    temp.onejob().args(&["results", &id]).passes().stdout_has("plan.xlsx");
    temp.onejob().args(&["job", "logs", &id]).passes().stdout_has("succeeded");
}

#[test]
fn failed_job_reports_reason_and_has_no_results() {
    let temp = Sandbox::with_worker(FAILING_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    let id = temp.submit("uploads/plan.xlsx");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&id) == "FAILED"));

    temp.onejob().args(&["status", &id]).passes().stdout_has("no sheet named Demand");
    temp.onejob().args(&["results", &id]).fails_with(4);
}

#[test]
fn unknown_parameter_is_rejected_by_daemon() {
    let temp = Sandbox::with_worker(REPORTING_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    temp.onejob()
        .args(&["submit", "uploads/plan.xlsx", "--param", "turbo=true"])
        .fails_with(2);
    temp.onejob().args(&["list"]).passes().stdout_has("No jobs");
}

#[test]
fn status_of_unknown_job_is_not_found() {
    let temp = Sandbox::with_worker(REPORTING_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    temp.onejob().args(&["status", "job-doesnotexist"]).fails_with(3);
}

#[test]
fn second_submission_waits_in_queue() {
    let temp = Sandbox::with_worker("sleep 5\n");
    temp.onejob().args(&["daemon", "start"]).passes();

    temp.submit("uploads/a.xlsx");
    temp.onejob()
        .args(&["submit", "uploads/b.xlsx"])
        .passes()
        .stdout_has("queued, position 0");
}
