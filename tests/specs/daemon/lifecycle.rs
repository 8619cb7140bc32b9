// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status and recovery across restarts.

use crate::prelude::*;

const SLOW_WORKER: &str = "sleep 5\n";

#[test]
fn daemon_status_when_not_running() {
    let temp = Sandbox::empty();

    temp.onejob().args(&["daemon", "status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Sandbox::with_worker(SLOW_WORKER);

    temp.onejob().args(&["daemon", "start"]).passes().stdout_has("Daemon started");
    temp.onejob()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Backend: process");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let temp = Sandbox::with_worker(SLOW_WORKER);

    temp.onejob().args(&["daemon", "start"]).passes();
    temp.onejob().args(&["daemon", "start"]).passes().stdout_has("already running");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Sandbox::with_worker(SLOW_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    temp.onejob().args(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");
    assert!(!temp.path().join("daemon.sock").exists());
    temp.onejob().args(&["daemon", "stop"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_start_surfaces_startup_error() {
    let temp = Sandbox::empty();

    temp.onejob()
        .args(&["daemon", "start"])
        .env("ONEJOB_BACKEND", "mainframe")
        .fails_with(1)
        .stderr_has("Daemon failed to start");
}

#[test]
fn jobs_survive_daemon_restart() {
    let temp = Sandbox::with_worker(SLOW_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    let first = temp.submit("uploads/first.xlsx");
    let second = temp.submit("uploads/second.xlsx");
    temp.onejob().args(&["daemon", "stop"]).passes();

    temp.onejob().args(&["daemon", "start"]).passes();
    let out = temp.onejob().args(&["list"]).passes().stdout();
    assert!(out.contains(&first[..12]), "first job missing after restart:\n{out}");
    assert!(out.contains(&second[..12]), "second job missing after restart:\n{out}");
}

#[test]
fn daemon_log_records_startup() {
    let temp = Sandbox::with_worker(SLOW_WORKER);
    temp.onejob().args(&["daemon", "start"]).passes();

    assert!(temp.daemon_log().contains("--- onejobd: starting"));
}
