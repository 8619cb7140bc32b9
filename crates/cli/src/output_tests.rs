// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn visible_len_skips_ansi() {
    assert_eq!(visible_len("\x1b[38;5;74mJOB\x1b[0m"), 3);
    assert_eq!(visible_len("plain"), 5);
}

#[test]
#[serial]
fn table_pads_columns_to_widest_cell() {
    std::env::set_var("NO_COLOR", "1");
    let rows = vec![
        vec!["job-a".to_string(), "queued".to_string()],
        vec!["job-abcdef".to_string(), "running".to_string()],
    ];
    let mut out = Vec::new();
    render_table(&["ID", "STATUS"], &rows, &mut out);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ID          STATUS");
    assert_eq!(lines[1], "job-a       queued");
    assert_eq!(lines[2], "job-abcdef  running");
}

#[test]
fn time_ago_of_zero_is_dash() {
    assert_eq!(format_time_ago(0), "-");
}

#[test]
fn json_output_is_ok_for_lists() {
    let items = vec![serde_json::json!({ "id": "job-a" })];
    assert!(handle_list(OutputFormat::Json, &items, "none", |_, _| {}).is_ok());
}
