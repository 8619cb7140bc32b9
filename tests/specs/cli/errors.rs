// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit codes for failures that never reach the daemon.

use crate::prelude::*;

#[test]
fn status_without_daemon_fails() {
    cli().args(&["status", "job-abc"]).fails_with(1).stderr_has("daemon is not running");
}

#[test]
fn list_without_daemon_fails() {
    cli().args(&["list"]).fails_with(1).stderr_has("onejob daemon start");
}

#[test]
fn malformed_param_is_a_validation_error() {
    cli().args(&["submit", "uploads/in.xlsx", "--param", "maxIterations"]).fails_with(2);
}

#[test]
fn complete_requires_an_outcome_flag() {
    cli().args(&["job", "complete", "onejob-123"]).fails_with(2).stderr_has("--succeeded");
}
