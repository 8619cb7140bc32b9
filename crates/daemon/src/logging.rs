// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon log setup.
//!
//! Everything goes to `daemon.log` through a non-blocking appender. Each start
//! first writes a plain-text marker line so the CLI can find the output of
//! the most recent startup attempt.

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Marker written at the top of every startup attempt.
pub fn startup_marker(pid: u32) -> String {
    format!("--- onejobd: starting (pid: {pid}) ---")
}

/// Append the startup marker, followed by a blank line.
pub fn write_startup_marker(log_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{}\n", startup_marker(std::process::id()))
}

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Keep the guard alive until exit.
pub fn init(config: &Config) -> std::io::Result<WorkerGuard> {
    let dir = config.log_path.parent().unwrap_or(&config.state_dir);
    std::fs::create_dir_all(dir)?;
    let file_name = config.log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("daemon.log"));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry().with(env_filter(&config.settings.log_level)).with(layer).init();
    Ok(guard)
}

/// Best-effort record of a fatal startup error, readable by the CLI.
pub fn write_startup_error(log_path: &Path, error: &dyn std::fmt::Display) {
    if let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(log_path) {
        let _ = writeln!(file, "ERROR Failed to start daemon: {error}");
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
