// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `onejob daemon` - Daemon management commands

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::daemon_process::{daemon_stop, run_foreground, start_daemon_background};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Check daemon status
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground).await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Status => status(format).await,
    }
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        return run_foreground();
    }

    if let Ok(client) = DaemonClient::connect() {
        if let Ok(status) = client.daemon_status().await {
            println!("Daemon already running (uptime: {})", format_uptime(status.uptime_secs));
            return Ok(());
        }
    }

    let state_dir = crate::env::state_dir()?;
    start_daemon_background(&state_dir).await?;
    println!("Daemon started");
    Ok(())
}

async fn stop() -> Result<()> {
    match daemon_stop().await {
        Ok(true) => {
            println!("Daemon stopped");
            Ok(())
        }
        Ok(false) => {
            println!("Daemon not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("Failed to stop daemon: {}", e)),
    }
}

async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return print_not_running(format),
    };

    let status = match client.daemon_status().await {
        Ok(status) => status,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(anyhow!("{}", e)),
    };
    let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());

    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "uptime_secs": status.uptime_secs,
        "uptime": format_uptime(status.uptime_secs),
        "backend": status.backend,
        "active": status.active,
        "queued": status.queued,
        "total": status.total,
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("Version: {}", version);
        println!("Uptime: {}", format_uptime(status.uptime_secs));
        println!("Backend: {}", status.backend);
        match status.active {
            Some(ref id) => println!("Active: {}", id),
            None => println!("Active: -"),
        }
        println!("Jobs: {} queued, {} total", status.queued, status.total);
    })
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("Daemon not running"))
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
