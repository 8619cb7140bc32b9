// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use onejob_wire::{JobDetail, JobSummary};

use crate::color;
use crate::output::{format_time_ago, render_table};

/// Multi-line description of one job.
pub(crate) fn print_job_detail(job: &JobDetail, out: &mut dyn Write) {
    let _ = writeln!(out, "{} {}", color::header("Job:"), job.id);
    let _ = writeln!(out, "  Status:    {}", color::status(job.status));
    let _ = writeln!(out, "  Message:   {}", job.message);
    if let Some(position) = job.queue_position {
        let _ = writeln!(out, "  Position:  {}", position);
    }
    if let Some(ref detail) = job.progress_detail {
        let _ = writeln!(out, "  Progress:  {}", detail);
    }
    let _ = writeln!(out, "  Input:     {}", job.input_ref);
    if !job.parameters.is_empty() {
        let params: Vec<String> =
            job.parameters.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let _ = writeln!(out, "  Params:    {}", params.join(" "));
    }
    let _ = writeln!(out, "  Submitted: {} ago", format_time_ago(job.submitted_at_ms));
    if let Some(started) = job.started_at_ms {
        let _ = writeln!(out, "  Started:   {} ago", format_time_ago(started));
    }
    if let Some(completed) = job.completed_at_ms {
        let _ = writeln!(out, "  Completed: {} ago", format_time_ago(completed));
    }
    if let Some(ref handle) = job.backend_handle {
        let _ = writeln!(out, "  Handle:    {}", color::muted(handle));
    }
    if job.dispatch_attempts > 0 {
        let _ = writeln!(out, "  Attempts:  {}", job.dispatch_attempts);
    }
    if job.cancel_requested && !job.status.is_terminal() {
        let _ = writeln!(out, "  {}", color::muted("cancel requested"));
    }
    if let Some(ref artifacts) = job.result {
        let _ = writeln!(out, "  Artifacts: {}", artifacts.len());
    }
}

pub(crate) fn print_job_table(jobs: &[JobSummary], out: &mut dyn Write) {
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|j| {
            vec![
                onejob_core::short(&j.id, 12).to_string(),
                color::status(j.status),
                j.queue_position.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                j.input_ref.clone(),
                format_time_ago(j.submitted_at_ms),
                j.message.clone(),
            ]
        })
        .collect();
    render_table(&["ID", "STATUS", "POS", "INPUT", "AGE", "MESSAGE"], &rows, out);
}
