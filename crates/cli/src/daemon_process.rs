// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning and stopping `onejobd`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::client::DaemonClient;

const STARTUP_MARKER_PREFIX: &str = "--- onejobd: starting";
const STARTUP_ERROR_PREFIX: &str = "ERROR Failed to start daemon: ";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Error from the most recent startup attempt recorded in `daemon.log`.
pub fn parse_startup_error(log: &str) -> Option<String> {
    let start = log.rfind(STARTUP_MARKER_PREFIX)?;
    log[start..]
        .lines()
        .find_map(|line| line.strip_prefix(STARTUP_ERROR_PREFIX))
        .map(|s| s.trim().to_string())
}

/// `ONEJOB_DAEMON_BINARY`, then a sibling of the current executable, then PATH.
pub fn find_daemon_binary() -> PathBuf {
    if let Some(path) = crate::env::daemon_binary() {
        return path;
    }
    if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
        let sibling = dir.join("onejobd");
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from("onejobd")
}

/// Run the daemon attached to this terminal until it exits.
pub fn run_foreground() -> Result<()> {
    let path = find_daemon_binary();
    let status = Command::new(&path)
        .status()
        .map_err(|e| anyhow!("failed to run {}: {}", path.display(), e))?;
    if !status.success() {
        return Err(anyhow!("Daemon exited with status: {}", status));
    }
    Ok(())
}

/// Spawn a detached daemon and wait until it answers a ping.
pub async fn start_daemon_background(state_dir: &Path) -> Result<DaemonClient> {
    let path = find_daemon_binary();
    let mut child = Command::new(&path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow!("failed to spawn {}: {}", path.display(), e))?;

    let socket_path = state_dir.join("daemon.sock");
    let deadline = Instant::now() + crate::env::daemon_start_timeout();
    loop {
        if let Ok(client) = DaemonClient::for_socket(socket_path.clone(), crate::env::ipc_timeout())
        {
            if client.ping().await.is_ok() {
                return Ok(client);
            }
        }

        // Exited early: the log says why
        if let Ok(Some(status)) = child.try_wait() {
            return Err(startup_failure(state_dir, Some(status)));
        }
        if Instant::now() >= deadline {
            return Err(startup_failure(state_dir, None));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn startup_failure(state_dir: &Path, status: Option<std::process::ExitStatus>) -> anyhow::Error {
    let log = std::fs::read_to_string(state_dir.join("daemon.log")).unwrap_or_default();
    match (parse_startup_error(&log), status) {
        (Some(reason), _) => anyhow!("Daemon failed to start: {}", reason),
        (None, Some(status)) => anyhow!("Daemon exited during startup ({})", status),
        (None, None) => anyhow!("Timed out waiting for daemon to start"),
    }
}

/// Ask a running daemon to shut down and wait for its socket to go away.
///
/// Returns `false` when no daemon was running.
pub async fn daemon_stop() -> Result<bool> {
    let client = match DaemonClient::connect() {
        Ok(client) => client,
        Err(_) => return Ok(false),
    };
    match client.shutdown().await {
        Ok(()) => {}
        Err(e) if e.is_not_running() => return Ok(false),
        Err(e) => return Err(e.into()),
    }

    let deadline = Instant::now() + crate::env::daemon_start_timeout();
    while client.socket_path().exists() {
        if Instant::now() >= deadline {
            return Err(anyhow!("daemon did not exit in time"));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    Ok(true)
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
