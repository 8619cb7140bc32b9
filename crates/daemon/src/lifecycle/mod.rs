// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

mod startup;
pub use startup::{build_backend, startup};

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use onejob_adapters::{BackendError, BackendRouter, CompletionNotice};
use onejob_core::SystemClock;
use onejob_engine::Engine;
use onejob_storage::StoreError;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};

/// Engine with the concrete backend and clock used by the daemon
pub type DaemonEngine = Engine<BackendRouter, SystemClock>;

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub engine: Arc<DaemonEngine>,
    /// When daemon started
    pub start_time: Instant,
}

/// Result of daemon startup.
///
/// The listener and the notice receiver are returned separately so the
/// caller can move them into their own tasks.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
    /// Completion notices pushed by the backend
    pub notices: mpsc::Receiver<CompletionNotice>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully.
    ///
    /// Backend jobs are left running. On next startup the store still names
    /// the active job and reconciliation picks up its outcome.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // Final snapshot so the next startup replays nothing
        match self.engine.store().checkpoint() {
            Ok(Some(result)) => {
                info!(seq = result.seq, size_bytes = result.size_bytes, "saved shutdown snapshot")
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to save shutdown snapshot"),
        }

        for path in [&self.config.socket_path, &self.config.lock_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove file");
                }
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
