// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs
//!
//! Verify help text displays for all commands.

use crate::prelude::*;

#[test]
fn onejob_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn onejob_help_lists_job_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("submit")
        .stdout_has("status")
        .stdout_has("list")
        .stdout_has("cancel")
        .stdout_has("results");
}

#[test]
fn onejob_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn onejob_job_help_shows_subcommands() {
    cli().args(&["job", "--help"]).passes().stdout_has("complete").stdout_has("logs");
}

#[test]
fn onejob_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}
