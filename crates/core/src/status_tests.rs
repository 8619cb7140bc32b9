// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    admit            = { JobStatus::Queued, JobStatus::Pending },
    withdraw         = { JobStatus::Queued, JobStatus::Cancelled },
    pending_starting = { JobStatus::Pending, JobStatus::Starting },
    starting_running = { JobStatus::Starting, JobStatus::Running },
    skip_to_running  = { JobStatus::Pending, JobStatus::Running },
    running_success  = { JobStatus::Running, JobStatus::Succeeded },
    pending_success  = { JobStatus::Pending, JobStatus::Succeeded },
    pending_failed   = { JobStatus::Pending, JobStatus::Failed },
    running_failed   = { JobStatus::Running, JobStatus::Failed },
    starting_cancel  = { JobStatus::Starting, JobStatus::Cancelled },
    requeue          = { JobStatus::Pending, JobStatus::Queued },
)]
fn allowed(from: JobStatus, to: JobStatus) {
    assert!(from.can_transition_to(to), "{from} -> {to} should be allowed");
    assert!(from.check_transition(to).is_ok());
}

#[parameterized(
    queued_running     = { JobStatus::Queued, JobStatus::Running },
    queued_succeeded   = { JobStatus::Queued, JobStatus::Succeeded },
    queued_failed      = { JobStatus::Queued, JobStatus::Failed },
    running_backwards  = { JobStatus::Running, JobStatus::Starting },
    running_requeue    = { JobStatus::Running, JobStatus::Queued },
    same_phase         = { JobStatus::Running, JobStatus::Running },
    succeeded_failed   = { JobStatus::Succeeded, JobStatus::Failed },
    failed_queued      = { JobStatus::Failed, JobStatus::Queued },
    cancelled_pending  = { JobStatus::Cancelled, JobStatus::Pending },
)]
fn rejected(from: JobStatus, to: JobStatus) {
    assert!(!from.can_transition_to(to));
    assert_eq!(from.check_transition(to), Err(TransitionError { from, to }));
}

#[test]
fn terminal_states_have_no_exits() {
    for from in JobStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
        for to in JobStatus::ALL {
            assert!(!from.can_transition_to(to), "{from} -> {to}");
        }
    }
}

#[test]
fn active_and_terminal_partition_non_queued() {
    for st in JobStatus::ALL {
        let buckets = [st == JobStatus::Queued, st.is_active(), st.is_terminal()];
        assert_eq!(buckets.iter().filter(|b| **b).count(), 1, "{st}");
    }
}

#[test]
fn serde_uses_screaming_case() {
    assert_eq!(serde_json::to_string(&JobStatus::Succeeded).unwrap(), "\"SUCCEEDED\"");
    let st: JobStatus = serde_json::from_str("\"QUEUED\"").unwrap();
    assert_eq!(st, JobStatus::Queued);
}

#[parameterized(
    upper = { "RUNNING", JobStatus::Running },
    lower = { "cancelled", JobStatus::Cancelled },
)]
fn parses_from_str(input: &str, expected: JobStatus) {
    assert_eq!(input.parse::<JobStatus>().unwrap(), expected);
}

#[test]
fn display_is_lowercase() {
    assert_eq!(JobStatus::Pending.to_string(), "pending");
}
