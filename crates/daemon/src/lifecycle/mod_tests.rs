// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::env;
use onejob_core::{JobStatus, Parameters};

fn test_config(dir: &std::path::Path) -> Config {
    Config::for_state_dir(dir.to_path_buf(), |key| {
        (key == env::PROCESS_COMMAND).then(|| "true".to_string())
    })
    .unwrap()
}

#[tokio::test]
async fn startup_creates_socket_and_pid_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();
    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(config.wal_path.parent().unwrap().is_dir());
    assert!(config.logs_path.is_dir());
    assert_eq!(result.daemon.engine.summary().backend, "process");
}

#[tokio::test]
async fn second_startup_fails_on_lock_and_leaves_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let _first = startup(&config).await.unwrap();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::LockFailed(_)));
    assert!(config.socket_path.exists());
    assert!(config.lock_path.exists());
}

#[tokio::test]
async fn empty_worker_command_fails_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.settings.process.command = "   ".into();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::Backend(_)));
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn shutdown_snapshots_and_removes_runtime_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let mut daemon = startup(&config).await.unwrap().daemon;

    daemon.engine.submit("a.xlsx", Parameters::new()).await.unwrap();
    daemon.shutdown().unwrap();

    assert!(config.snapshot_path.exists());
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn restart_recovers_jobs_and_fails_one_the_backend_forgot() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let (active, queued) = {
        let mut daemon = startup(&config).await.unwrap().daemon;
        let active = daemon.engine.submit("a.xlsx", Parameters::new()).await.unwrap();
        let queued = daemon.engine.submit("b.xlsx", Parameters::new()).await.unwrap();
        daemon.shutdown().unwrap();
        (active.id, queued.id)
    };

    let daemon = startup(&config).await.unwrap().daemon;
    assert_eq!(daemon.engine.list(None).len(), 2);

    // A fresh process backend has no record of the old worker
    daemon.engine.recover().await.unwrap();
    let lost = daemon.engine.store().get_job(active.as_str()).unwrap();
    assert_eq!(lost.status, JobStatus::Failed);
    assert_eq!(lost.failure_reason.as_deref(), Some("backend lost track of job"));
    let next = daemon.engine.store().get_job(queued.as_str()).unwrap();
    assert_eq!(next.status, JobStatus::Pending);
}
