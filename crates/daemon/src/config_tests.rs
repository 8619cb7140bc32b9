// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;
use yare::parameterized;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_file_or_env() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().to_path_buf(), no_env).unwrap();
    assert_eq!(config.settings, Settings::default());
    assert_eq!(config.settings.reconcile_interval_ms, 30_000);
    assert_eq!(config.settings.max_dispatch_attempts, 3);
    assert_eq!(config.settings.checkpoint_every, 500);
    assert_eq!(config.settings.backend, BackendKind::Process);
    assert_eq!(config.settings.process.command, "onejob-worker");
    assert_eq!(config.socket_path, dir.path().join("daemon.sock"));
    assert_eq!(config.wal_path, dir.path().join("wal/events.wal"));
    assert_eq!(config.snapshot_path, dir.path().join("snapshot.zst"));
}

#[test]
fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        r#"
reconcile_interval_ms = 1000
backend = "kubernetes"

[kubernetes]
namespace = "batch"
image = "registry.local/worker:2"
"#,
    )
    .unwrap();

    let config = Config::for_state_dir(dir.path().to_path_buf(), no_env).unwrap();
    assert_eq!(config.settings.reconcile_interval_ms, 1000);
    assert_eq!(config.settings.backend, BackendKind::Kubernetes);
    assert_eq!(config.settings.kubernetes.namespace, "batch");
    assert_eq!(config.settings.kubernetes.image, "registry.local/worker:2");
    assert_eq!(config.settings.kubernetes.poll_interval_ms, 5_000);
    assert_eq!(config.settings.max_dispatch_attempts, 3);
}

#[test]
fn env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "max_dispatch_attempts = 7\n").unwrap();
    let lookup = env_of(&[
        (env::MAX_DISPATCH_ATTEMPTS, "2"),
        (env::PROCESS_COMMAND, "python3 worker.py"),
        (env::CHECKPOINT_EVERY, "50"),
    ]);

    let config = Config::for_state_dir(dir.path().to_path_buf(), lookup).unwrap();
    assert_eq!(config.settings.max_dispatch_attempts, 2);
    assert_eq!(config.settings.process.command, "python3 worker.py");
    assert_eq!(config.store_config().checkpoint_every, 50);
}

#[test]
fn malformed_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "backend = 12").unwrap();
    let err = Config::for_state_dir(dir.path().to_path_buf(), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}

#[parameterized(
    reconcile = { env::RECONCILE_MS, "soon" },
    attempts = { env::MAX_DISPATCH_ATTEMPTS, "-1" },
    backend = { env::BACKEND, "lambda" },
)]
fn invalid_env_value_is_error(key: &str, value: &str) {
    let mut settings = Settings::default();
    let err = settings.apply_env(env_of(&[(key, value)])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { .. }));
}

#[parameterized(
    process = { "process", BackendKind::Process },
    kubernetes = { "kubernetes", BackendKind::Kubernetes },
    k8s_alias = { "k8s", BackendKind::Kubernetes },
)]
fn backend_kind_from_env(raw: &str, expected: BackendKind) {
    let mut settings = Settings::default();
    settings.apply_env(env_of(&[(env::BACKEND, raw)])).unwrap();
    assert_eq!(settings.backend, expected);
}

#[test]
fn engine_config_clamps_attempts_to_one() {
    let settings = Settings { max_dispatch_attempts: 0, ..Settings::default() };
    assert_eq!(settings.engine_config().max_dispatch_attempts, 1);
}
