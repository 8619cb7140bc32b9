// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use onejob_adapters::{BackendRouter, KubernetesBackend, KubernetesConfig, ProcessBackend};
use onejob_core::SystemClock;
use onejob_engine::{Engine, JobLogger};
use onejob_storage::JobStore;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::info;

use super::{DaemonState, LifecycleError, StartupResult};
use crate::config::{BackendKind, Config, Settings};

/// Capacity of the backend's completion notice channel
const NOTICE_BUFFER: usize = 256;

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock;
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races.
    // Open without truncating so a running daemon's PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Create directories
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.logs_path)?;

    // 4. Recover the job store from snapshot + WAL
    let store = JobStore::open(&config.store_config())?;

    // 5. Connect the compute backend
    let backend = build_backend(config).await?;
    info!(backend = backend_label(&config.settings), "compute backend ready");

    // 6. Engine; the backend pushes completions into `notices`
    let (notice_tx, notices) = mpsc::channel(NOTICE_BUFFER);
    let engine = Engine::new(
        store,
        backend,
        SystemClock,
        config.settings.engine_config(),
        notice_tx,
    )
    .with_job_logger(JobLogger::new(config.logs_path.clone()));

    // 7. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(state_dir = %config.state_dir.display(), "daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            engine: Arc::new(engine),
            start_time: Instant::now(),
        },
        listener,
        notices,
    })
}

/// Construct the configured backend.
pub async fn build_backend(config: &Config) -> Result<BackendRouter, LifecycleError> {
    let settings = &config.settings;
    let backend = match settings.backend {
        BackendKind::Process => ProcessBackend::from_command_line(&settings.process.command)?
            .with_workdir(config.state_dir.clone())
            .into(),
        BackendKind::Kubernetes => {
            let k8s = &settings.kubernetes;
            KubernetesBackend::connect(KubernetesConfig {
                namespace: k8s.namespace.clone(),
                image: k8s.image.clone(),
                service_account: k8s.service_account.clone(),
                poll_interval: Duration::from_millis(k8s.poll_interval_ms.max(100)),
            })
            .await?
            .into()
        }
    };
    Ok(backend)
}

fn backend_label(settings: &Settings) -> &'static str {
    match settings.backend {
        BackendKind::Process => "process",
        BackendKind::Kubernetes => "kubernetes",
    }
}

/// Remove files a failed startup may have left behind.
fn cleanup_on_failure(config: &Config) {
    let _ = std::fs::remove_file(&config.socket_path);
    let _ = std::fs::remove_file(&config.lock_path);
}
