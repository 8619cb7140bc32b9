// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn submit_serializes_with_type_tag() {
    let request = Request::Submit {
        input_ref: "uploads/plan.xlsx".into(),
        parameters: Parameters::new().with("maxIterations", 5),
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "Submit",
            "input_ref": "uploads/plan.xlsx",
            "parameters": { "maxIterations": 5 },
        })
    );
}

#[test]
fn submit_without_parameters_defaults_to_empty() {
    let request: Request =
        serde_json::from_value(json!({ "type": "Submit", "input_ref": "a" })).unwrap();
    assert_eq!(request, Request::Submit { input_ref: "a".into(), parameters: Parameters::new() });
}

#[test]
fn complete_carries_tagged_outcome() {
    let request = Request::Complete {
        target: "proc-1".into(),
        outcome: Outcome::Failed { reason: "oom".into() },
    };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["outcome"], json!({ "outcome": "failed", "reason": "oom" }));
}

#[test]
fn list_omits_missing_limit() {
    let value = serde_json::to_value(Request::List { limit: None }).unwrap();
    assert_eq!(value, json!({ "type": "List" }));
}

#[parameterized(
    ping = { Request::Ping, true },
    status = { Request::Status { id: "job-1".into() }, true },
    list = { Request::List { limit: Some(3) }, true },
    logs = { Request::Logs { id: "job-1".into() }, true },
    submit = { Request::Submit { input_ref: "a".into(), parameters: Parameters::new() }, false },
    cancel = { Request::Cancel { id: "job-1".into() }, false },
    shutdown = { Request::Shutdown, false },
)]
fn query_classification(request: Request, expected: bool) {
    assert_eq!(request.is_query(), expected);
}
