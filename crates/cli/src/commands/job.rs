// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job commands: `submit`, `status`, `list`, `cancel`, `results`, `job ...`

use anyhow::Result;
use clap::{ArgGroup, Args, Subcommand};

use onejob_core::{Outcome, Parameters};

use super::job_display::{print_job_detail, print_job_table};
use crate::client::DaemonClient;
use crate::exit_error::{ExitError, EXIT_VALIDATION};
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Report a terminal outcome for a backend handle or job ID
    #[command(group(
        ArgGroup::new("outcome").required(true).args(["succeeded", "failed", "cancelled"])
    ))]
    Complete {
        /// Backend handle, or job ID (prefix match)
        target: String,
        /// The job produced its artifacts
        #[arg(long)]
        succeeded: bool,
        /// Artifact key produced by the job (repeatable, with --succeeded)
        #[arg(long = "artifact", requires = "succeeded")]
        artifacts: Vec<String>,
        /// The job failed with this reason
        #[arg(long, value_name = "REASON")]
        failed: Option<String>,
        /// The job was cancelled on the backend
        #[arg(long)]
        cancelled: bool,
    },
    /// Show the activity log of a job
    Logs {
        /// Job ID (prefix match)
        id: String,
    },
}

/// Parse repeated `--param key=value` flags, rejecting malformed ones with exit code 2.
pub fn parse_params(raw: &[String]) -> Result<Parameters, ExitError> {
    let mut params = Parameters::new();
    for assignment in raw {
        let (key, value) = Parameters::parse_assignment(assignment)
            .map_err(|e| ExitError::new(EXIT_VALIDATION, e.to_string()))?;
        params.insert(key, value);
    }
    Ok(params)
}

/// The outcome named by `job complete` flags.
pub fn outcome_from_flags(
    succeeded: bool,
    artifacts: Vec<String>,
    failed: Option<String>,
    cancelled: bool,
) -> Result<Outcome, ExitError> {
    match (succeeded, failed, cancelled) {
        (true, None, false) => Ok(Outcome::Succeeded { artifacts }),
        (false, Some(reason), false) => Ok(Outcome::Failed { reason }),
        (false, None, true) => Ok(Outcome::Cancelled),
        _ => Err(ExitError::new(
            EXIT_VALIDATION,
            "exactly one of --succeeded, --failed or --cancelled is required",
        )),
    }
}

pub async fn submit(input_ref: &str, params: &[String], format: OutputFormat) -> Result<()> {
    let parameters = parse_params(params)?;
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let job = client.submit(input_ref, parameters).await.map_err(ExitError::from)?;

    format_or_json(format, &job, || match job.queue_position {
        Some(position) => println!("Submitted {} (queued, position {})", job.id, position),
        None => println!("Submitted {} ({})", job.id, job.status),
    })
}

pub async fn status(id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let job = client.status(id).await.map_err(ExitError::from)?;
    format_or_json(format, &job, || print_job_detail(&job, &mut std::io::stdout()))
}

pub async fn list(limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let jobs = client.list(limit).await.map_err(ExitError::from)?;
    handle_list(format, &jobs, "No jobs", print_job_table)
}

pub async fn cancel(id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let job = client.cancel(id).await.map_err(ExitError::from)?;

    format_or_json(format, &job, || {
        if job.status.is_terminal() {
            println!("{}: {}", job.id, job.message);
        } else {
            println!("Cancel requested for {} ({})", job.id, job.status);
        }
    })
}

pub async fn results(id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let (id, artifacts) = client.results(id).await.map_err(ExitError::from)?;

    let obj = serde_json::json!({ "id": id, "artifacts": artifacts });
    format_or_json(format, &obj, || {
        if artifacts.is_empty() {
            println!("{} succeeded with no artifacts", id);
        }
        for artifact in &artifacts {
            println!("{}", artifact);
        }
    })
}

pub async fn job(args: JobArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        JobCommand::Complete { target, succeeded, artifacts, failed, cancelled } => {
            let outcome = outcome_from_flags(succeeded, artifacts, failed, cancelled)?;
            complete(&target, outcome, format).await
        }
        JobCommand::Logs { id } => logs(&id, format).await,
    }
}

async fn complete(target: &str, outcome: Outcome, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let label = outcome.to_string();
    match client.complete(target, outcome).await.map_err(ExitError::from)? {
        Some(job) => format_or_json(format, &job, || println!("{}: {}", job.id, job.message)),
        None => {
            let obj = serde_json::json!({ "target": target, "outcome": label });
            format_or_json(format, &obj, || println!("Recorded {} for {}", label, target))
        }
    }
}

async fn logs(id: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let (id, lines) = client.job_logs(id).await.map_err(ExitError::from)?;

    let obj = serde_json::json!({ "id": id, "lines": lines });
    format_or_json(format, &obj, || {
        if lines.is_empty() {
            println!("No log entries for {}", id);
        }
        for line in &lines {
            println!("{}", line);
        }
    })
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
