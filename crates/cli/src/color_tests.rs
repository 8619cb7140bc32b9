// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use yare::parameterized;

fn force_color() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
}

fn disable_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn styles_returns_styled_when_color_forced() {
    force_color();
    let debug = format!("{:?}", styles());
    assert_ne!(debug, format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn styles_returns_plain_when_no_color() {
    disable_color();
    assert_eq!(format!("{:?}", styles()), format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn header_produces_ansi_when_color_forced() {
    force_color();
    let result = header("JOBS");
    assert!(result.contains("\x1b[38;5;74m"), "expected ANSI header color");
    assert!(result.contains("JOBS"));
    assert!(result.ends_with("\x1b[0m"), "expected ANSI reset");
}

#[parameterized(
    succeeded = { JobStatus::Succeeded, codes::SUCCESS },
    failed = { JobStatus::Failed, codes::FAILURE },
    running = { JobStatus::Running, codes::ACTIVE },
    pending = { JobStatus::Pending, codes::ACTIVE },
    queued = { JobStatus::Queued, codes::MUTED },
    cancelled = { JobStatus::Cancelled, codes::MUTED },
)]
#[serial]
fn status_color_by_kind(s: JobStatus, code: u8) {
    force_color();
    assert!(status(s).starts_with(&format!("\x1b[38;5;{code}m")));
}

#[test]
#[serial]
fn helpers_plain_when_no_color() {
    disable_color();
    assert_eq!(header("foo"), "foo");
    assert_eq!(muted("dim"), "dim");
    assert_eq!(status(JobStatus::Running), "running");
}

#[test]
#[serial]
fn should_colorize_respects_no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::set_var("COLOR", "1");
    assert!(!should_colorize(), "NO_COLOR=1 should override COLOR=1");
}
