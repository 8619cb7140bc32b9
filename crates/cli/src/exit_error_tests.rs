// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    validation = { ErrorKind::Validation, 2 },
    not_found = { ErrorKind::NotFound, 3 },
    not_ready = { ErrorKind::NotReady, 4 },
    internal = { ErrorKind::Internal, 1 },
)]
fn rejected_request_maps_to_exit_code(kind: ErrorKind, code: i32) {
    let err = ExitError::from(ClientError::Rejected { kind, message: "nope".into() });
    assert_eq!(err.code, code);
    assert_eq!(err.to_string(), "nope");
}

#[test]
fn daemon_not_running_is_generic_failure() {
    let err = ExitError::from(ClientError::DaemonNotRunning);
    assert_eq!(err.code, EXIT_FAILURE);
    assert!(err.message.contains("not running"));
}
