// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! batch/v1 Job construction and status interpretation.

use k8s_openapi::api::batch::v1::{Job as BatchJob, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use onejob_core::{Phase, PhaseReport};
use std::collections::BTreeMap;

/// Annotation carrying the onejob job id.
pub(super) const JOB_ID_ANNOTATION: &str = "onejob.io/job-id";
/// Annotation the worker patches with its artifact keys (JSON array).
pub(super) const ARTIFACTS_ANNOTATION: &str = "onejob.io/artifacts";
/// Annotation the worker patches with free-form progress text.
pub(super) const PROGRESS_ANNOTATION: &str = "onejob.io/progress";

const MANAGED_BY: &str = "onejob";
const FINISHED_TTL_SECS: i32 = 86_400;

pub(super) struct JobParams<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
    pub image: &'a str,
    pub job_id: &'a str,
    pub service_account: Option<&'a str>,
    pub env: Vec<(String, String)>,
}

/// Build a single-attempt batch Job for one onejob job.
pub(super) fn build_job(params: &JobParams<'_>) -> BatchJob {
    let labels = BTreeMap::from([(
        "app.kubernetes.io/managed-by".to_string(),
        MANAGED_BY.to_string(),
    )]);
    let annotations = BTreeMap::from([(JOB_ID_ANNOTATION.to_string(), params.job_id.to_string())]);

    let env = params
        .env
        .iter()
        .map(|(name, value)| EnvVar {
            name: name.clone(),
            value: Some(value.clone()),
            ..Default::default()
        })
        .collect();

    BatchJob {
        metadata: ObjectMeta {
            name: Some(params.name.to_string()),
            namespace: Some(params.namespace.to_string()),
            labels: Some(labels.clone()),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(0),
            ttl_seconds_after_finished: Some(FINISHED_TTL_SECS),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels), ..Default::default() }),
                spec: Some(PodSpec {
                    restart_policy: Some("Never".to_string()),
                    service_account_name: params.service_account.map(str::to_string),
                    containers: vec![Container {
                        name: "worker".to_string(),
                        image: Some(params.image.to_string()),
                        env: Some(env),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Map a Job object onto a phase report.
///
/// Terminal conditions win over counters; an active pod that is not yet
/// ready is still starting.
pub(super) fn report_from_job(job: &BatchJob) -> PhaseReport {
    let annotations = job.metadata.annotations.as_ref();
    let detail = annotations.and_then(|a| a.get(PROGRESS_ANNOTATION)).cloned();
    let status = job.status.clone().unwrap_or_default();
    let conditions = status.conditions.unwrap_or_default();
    let condition = |kind: &str| {
        conditions.iter().find(|c| c.type_ == kind && c.status.eq_ignore_ascii_case("true"))
    };

    let mut report = if condition("Complete").is_some() || status.succeeded.unwrap_or(0) > 0 {
        let artifacts = annotations
            .and_then(|a| a.get(ARTIFACTS_ANNOTATION))
            .map(|raw| parse_artifacts(raw))
            .unwrap_or_default();
        PhaseReport::new(Phase::Succeeded).artifacts(artifacts)
    } else if let Some(failed) = condition("Failed") {
        let reason = failed
            .message
            .clone()
            .or_else(|| failed.reason.clone())
            .unwrap_or_else(|| "job failed".to_string());
        PhaseReport::new(Phase::Failed).reason(reason)
    } else if status.failed.unwrap_or(0) > 0 {
        PhaseReport::new(Phase::Failed).reason("job pod failed")
    } else if status.active.unwrap_or(0) > 0 {
        let phase = if status.ready.unwrap_or(0) > 0 { Phase::Running } else { Phase::Starting };
        PhaseReport::new(phase)
    } else {
        PhaseReport::new(Phase::Pending)
    };
    report.detail = detail;
    report
}

/// Artifacts are a JSON array of keys; a bare comma list is also accepted.
fn parse_artifacts(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(keys) => keys,
        Err(_) => raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect(),
    }
}

/// Coerce a name into an RFC 1123 label: lowercase alphanumerics and `-`,
/// at most 63 characters, alphanumeric at both ends.
pub(super) fn dns_label(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .take(63)
        .collect();
    mapped.trim_matches('-').to_string()
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
