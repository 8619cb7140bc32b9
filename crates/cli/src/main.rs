// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `onejob` - client for the single-slot job daemon
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod daemon_process;
mod env;
mod exit_error;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{daemon, job};
use exit_error::{ExitError, EXIT_FAILURE};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "onejob", version, about = "Submit and track jobs on the onejob daemon")]
#[command(styles = color::styles())]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job for an input reference
    Submit {
        /// Input file reference (e.g. uploads/plan.xlsx)
        input_ref: String,
        /// Job parameter (repeatable: --param key=value)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// Show a job's status
    Status {
        /// Job ID (prefix match)
        id: String,
    },
    /// List jobs, newest first
    List {
        /// Maximum number of jobs to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Cancel a queued or running job
    Cancel {
        /// Job ID (prefix match)
        id: String,
    },
    /// Show the artifacts of a succeeded job
    Results {
        /// Job ID (prefix match)
        id: String,
    },
    /// Job maintenance commands
    Job(job::JobArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    match cli.command {
        Commands::Submit { input_ref, params } => job::submit(&input_ref, &params, format).await,
        Commands::Status { id } => job::status(&id, format).await,
        Commands::List { limit } => job::list(limit, format).await,
        Commands::Cancel { id } => job::cancel(&id, format).await,
        Commands::Results { id } => job::results(&id, format).await,
        Commands::Job(args) => job::job(args, format).await,
        Commands::Daemon(args) => daemon::daemon(args, format).await,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::from(EXIT_FAILURE as u8);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("Error: {}", exit.message);
                }
                ExitCode::from(exit.code as u8)
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(EXIT_FAILURE as u8)
            }
        },
    }
}
