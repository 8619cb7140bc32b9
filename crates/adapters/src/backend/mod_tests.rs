// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn backend_name_uses_id_suffix() {
    let request = SubmitRequest::new(JobId::from_string("job-Abc_123"), "uploads/in.xlsx");
    assert_eq!(request.backend_name(), "onejob-Abc_123");
}

#[test]
fn worker_env_puts_identity_first() {
    let request = SubmitRequest::new(JobId::from_string("job-1"), "uploads/in.xlsx")
        .env(vec![("MAX_ITERATIONS".into(), "3".into())]);
    let env = request.worker_env();
    assert_eq!(env[0], ("JOB_ID".to_string(), "job-1".to_string()));
    assert_eq!(env[1], ("INPUT_REF".to_string(), "uploads/in.xlsx".to_string()));
    assert_eq!(env[2], ("MAX_ITERATIONS".to_string(), "3".to_string()));
}
