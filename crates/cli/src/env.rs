// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve state directory: ONEJOB_STATE_DIR > XDG_STATE_HOME/onejob > ~/.local/state/onejob
///
/// Must agree with the daemon's resolution.
pub fn state_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("ONEJOB_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("onejob"));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
    Ok(home.join(".local/state/onejob"))
}

/// Timeout for one request/response exchange
pub fn ipc_timeout() -> Duration {
    std::env::var("ONEJOB_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// How long `daemon start` waits for the socket to answer
pub fn daemon_start_timeout() -> Duration {
    std::env::var("ONEJOB_DAEMON_START_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// Explicit path to the `onejobd` binary
pub fn daemon_binary() -> Option<PathBuf> {
    std::env::var("ONEJOB_DAEMON_BINARY").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}
