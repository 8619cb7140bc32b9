// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn params_parse_into_json_values() {
    let params = parse_params(&["maxIterations=5".to_string(), "label=fast".to_string()]).unwrap();
    let collected: Vec<_> = params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    assert_eq!(
        collected,
        vec![("label".to_string(), json!("fast")), ("maxIterations".to_string(), json!(5))]
    );
}

#[parameterized(
    no_equals = { "maxIterations" },
    empty_key = { "=5" },
)]
fn malformed_param_exits_with_validation_code(raw: &str) {
    let err = parse_params(&[raw.to_string()]).unwrap_err();
    assert_eq!(err.code, EXIT_VALIDATION);
}

#[test]
fn succeeded_flag_carries_artifacts() {
    let outcome = outcome_from_flags(true, vec!["out/a.xlsx".to_string()], None, false).unwrap();
    assert_eq!(outcome, Outcome::Succeeded { artifacts: vec!["out/a.xlsx".to_string()] });
}

#[test]
fn failed_flag_carries_reason() {
    let outcome = outcome_from_flags(false, vec![], Some("oom".to_string()), false).unwrap();
    assert_eq!(outcome, Outcome::Failed { reason: "oom".to_string() });
}

#[test]
fn cancelled_flag() {
    assert_eq!(outcome_from_flags(false, vec![], None, true).unwrap(), Outcome::Cancelled);
}

#[parameterized(
    none = { false, None, false },
    two = { true, Some("x"), false },
    all = { true, Some("x"), true },
)]
fn outcome_flags_must_name_exactly_one(succeeded: bool, failed: Option<&str>, cancelled: bool) {
    let err = outcome_from_flags(succeeded, vec![], failed.map(str::to_string), cancelled)
        .unwrap_err();
    assert_eq!(err.code, EXIT_VALIDATION);
}
