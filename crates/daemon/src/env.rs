// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const STATE_DIR: &str = "ONEJOB_STATE_DIR";
pub const IPC_TIMEOUT_MS: &str = "ONEJOB_IPC_TIMEOUT_MS";
pub const RECONCILE_MS: &str = "ONEJOB_RECONCILE_MS";
pub const MAX_DISPATCH_ATTEMPTS: &str = "ONEJOB_MAX_DISPATCH_ATTEMPTS";
pub const CHECKPOINT_EVERY: &str = "ONEJOB_CHECKPOINT_EVERY";
pub const BACKEND: &str = "ONEJOB_BACKEND";
pub const PROCESS_COMMAND: &str = "ONEJOB_PROCESS_COMMAND";
pub const K8S_NAMESPACE: &str = "ONEJOB_K8S_NAMESPACE";
pub const K8S_IMAGE: &str = "ONEJOB_K8S_IMAGE";

/// Resolve state directory: ONEJOB_STATE_DIR > XDG_STATE_HOME/onejob > ~/.local/state/onejob
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var(STATE_DIR) {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("onejob"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/onejob"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var(IPC_TIMEOUT_MS)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Non-empty value of an environment variable.
pub fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}
