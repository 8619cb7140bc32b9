// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::format_uptime;
use yare::parameterized;

#[parameterized(
    seconds = { 42, "42s" },
    minutes = { 125, "2m 5s" },
    hours = { 3_725, "1h 2m 5s" },
    exact_hour = { 3_600, "1h 0m 0s" },
)]
fn uptime_formatting(secs: u64, expected: &str) {
    assert_eq!(format_uptime(secs), expected);
}
