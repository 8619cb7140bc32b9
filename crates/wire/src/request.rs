// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use onejob_core::{Outcome, Parameters};
use serde::{Deserialize, Serialize};

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Submit a new job
    Submit {
        input_ref: String,
        #[serde(default)]
        parameters: Parameters,
    },

    /// Best-known status of one job (id or unique prefix)
    Status { id: String },

    /// Jobs newest-first, optionally truncated
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },

    /// Cancel a queued or active job
    Cancel { id: String },

    /// Artifacts of a succeeded job
    Results { id: String },

    /// Report a terminal outcome from outside the backend's own channel.
    ///
    /// `target` is a backend handle or a job id (prefix).
    Complete { target: String, outcome: Outcome },

    /// Per-job activity log
    Logs { id: String },

    /// Get daemon status
    DaemonStatus,

    /// Request daemon shutdown
    Shutdown,
}

impl Request {
    /// Read-only requests polled frequently by clients.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Request::Ping
                | Request::Status { .. }
                | Request::List { .. }
                | Request::Results { .. }
                | Request::Logs { .. }
                | Request::DaemonStatus
        )
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
