// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

use onejob_wire::ErrorKind;

use crate::client::ClientError;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_VALIDATION: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_NOT_READY: i32 = 4;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

pub fn code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => EXIT_VALIDATION,
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::NotReady => EXIT_NOT_READY,
        ErrorKind::Internal => EXIT_FAILURE,
    }
}

impl From<ClientError> for ExitError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Rejected { kind, message } => ExitError::new(code_for(kind), message),
            other => ExitError::new(EXIT_FAILURE, other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
