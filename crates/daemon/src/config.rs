// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon settings: defaults, overlaid by `<state_dir>/config.toml`, overlaid
//! by environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use onejob_engine::EngineConfig;
use onejob_storage::StoreConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("invalid config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Process,
    Kubernetes,
}

impl FromStr for BackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(BackendKind::Process),
            "kubernetes" | "k8s" => Ok(BackendKind::Kubernetes),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProcessSettings {
    /// Worker command line, split on whitespace.
    pub command: String,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self { command: "onejob-worker".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KubernetesSettings {
    pub namespace: String,
    pub image: String,
    pub service_account: Option<String>,
    pub poll_interval_ms: u64,
}

impl Default for KubernetesSettings {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            image: "onejob-worker:latest".to_string(),
            service_account: None,
            poll_interval_ms: 5_000,
        }
    }
}

/// Tunables read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reconcile_interval_ms: u64,
    pub max_dispatch_attempts: u32,
    pub stale_admission_ms: u64,
    pub checkpoint_every: u64,
    pub backend: BackendKind,
    pub process: ProcessSettings,
    pub kubernetes: KubernetesSettings,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            reconcile_interval_ms: 30_000,
            max_dispatch_attempts: engine.max_dispatch_attempts,
            stale_admission_ms: engine.stale_admission_ms,
            checkpoint_every: 500,
            backend: BackendKind::Process,
            process: ProcessSettings::default(),
            kubernetes: KubernetesSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse a config file; a missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Read(path.to_path_buf(), e)),
        }
    }

    /// Overlay environment overrides, reading values through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup(env::RECONCILE_MS) {
            self.reconcile_interval_ms = parse(env::RECONCILE_MS, v)?;
        }
        if let Some(v) = lookup(env::MAX_DISPATCH_ATTEMPTS) {
            self.max_dispatch_attempts = parse(env::MAX_DISPATCH_ATTEMPTS, v)?;
        }
        if let Some(v) = lookup(env::CHECKPOINT_EVERY) {
            self.checkpoint_every = parse(env::CHECKPOINT_EVERY, v)?;
        }
        if let Some(v) = lookup(env::BACKEND) {
            self.backend = parse(env::BACKEND, v)?;
        }
        if let Some(v) = lookup(env::PROCESS_COMMAND) {
            self.process.command = v;
        }
        if let Some(v) = lookup(env::K8S_NAMESPACE) {
            self.kubernetes.namespace = v;
        }
        if let Some(v) = lookup(env::K8S_IMAGE) {
            self.kubernetes.image = v;
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_dispatch_attempts: self.max_dispatch_attempts.max(1),
            stale_admission_ms: self.stale_admission_ms,
        }
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms.max(100))
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv { key, value })
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/onejob)
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    /// Lock file holding the daemon's PID
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Per-job activity logs
    pub logs_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Load configuration from the environment-selected state directory.
    pub fn load() -> Result<Self, crate::lifecycle::LifecycleError> {
        let state_dir = env::state_dir()?;
        Ok(Self::for_state_dir(state_dir, env::var)?)
    }

    /// Derive paths under `state_dir` and resolve settings.
    pub fn for_state_dir(
        state_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Settings::from_file(&state_dir.join("config.toml"))?;
        settings.apply_env(lookup)?;
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.zst"),
            logs_path: state_dir.join("logs"),
            state_dir,
            settings,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            wal_path: self.wal_path.clone(),
            snapshot_path: self.snapshot_path.clone(),
            checkpoint_every: self.settings.checkpoint_every,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
