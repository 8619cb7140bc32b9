// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::BackendHandle;

#[test]
fn summary_carries_display_message() {
    let job = Job::builder().queue_position(2u32).build();
    let summary = JobSummary::from(&job);
    assert_eq!(summary.id, "job-test1");
    assert_eq!(summary.status, JobStatus::Queued);
    assert_eq!(summary.queue_position, Some(2));
    assert_eq!(summary.message, "Queued (position 2)");
}

#[test]
fn detail_from_failed_job() {
    let job = Job::builder()
        .status(JobStatus::Failed)
        .failure_reason("worker exited with status 1")
        .completed_at_ms(2_000_000u64)
        .dispatch_attempts(1)
        .build();
    let detail = JobDetail::from_job(&job);
    assert_eq!(detail.message, "Failed: worker exited with status 1");
    assert_eq!(detail.failure_reason.as_deref(), Some("worker exited with status 1"));
    assert_eq!(detail.dispatch_attempts, 1);
    assert_eq!(detail.progress_detail, None);
}

#[test]
fn overlay_replaces_status_but_keeps_record_fields() {
    let job = Job::builder()
        .status(JobStatus::Pending)
        .backend_handle(BackendHandle::new("proc-7"))
        .build();
    let detail = JobDetail::with_overlay(
        &job,
        JobStatus::Running,
        "Running...".into(),
        Some("iteration 1/3".into()),
    );
    assert_eq!(detail.status, JobStatus::Running);
    assert_eq!(detail.backend_handle.as_deref(), Some("proc-7"));
    assert_eq!(detail.progress_detail.as_deref(), Some("iteration 1/3"));
}

#[test]
fn detail_json_omits_empty_optionals() {
    let detail = JobDetail::from_job(&Job::builder().build());
    let value = serde_json::to_value(&detail).unwrap();
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("result"));
    assert!(!obj.contains_key("progress_detail"));
    assert_eq!(obj["status"], "QUEUED");
}
