// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes backend: one batch/v1 Job per onejob job.
//!
//! Handles are `<namespace>/<job name>`. A watcher task polls each submitted
//! Job until it reaches a terminal condition and then pushes a completion
//! notice. Workers report artifacts and progress by patching annotations on
//! their own Job object.

mod spec;

use super::{BackendError, CompletionNotice, ComputeBackend, SubmitRequest};
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job as BatchJob;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use onejob_core::{BackendHandle, JobId, Phase, PhaseReport};
use parking_lot::Mutex;
use spec::JobParams;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubernetesConfig {
    pub namespace: String,
    pub image: String,
    pub service_account: Option<String>,
    pub poll_interval: Duration,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            image: "onejob-worker:latest".to_string(),
            service_account: None,
            poll_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct KubernetesBackend {
    client: Client,
    config: KubernetesConfig,
    /// Handles we deleted on request; a vanished Job in this set was cancelled.
    cancelled: Arc<Mutex<HashSet<BackendHandle>>>,
}

impl KubernetesBackend {
    pub async fn connect(config: KubernetesConfig) -> Result<Self, BackendError> {
        let client = Client::try_default().await.map_err(|e| {
            BackendError::Unavailable(format!("failed to create kube client: {}", e))
        })?;
        Ok(Self { client, config, cancelled: Arc::new(Mutex::new(HashSet::new())) })
    }

    fn jobs(&self, namespace: &str) -> Api<BatchJob> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn watch(
        self,
        job_id: JobId,
        handle: BackendHandle,
        notices: mpsc::Sender<CompletionNotice>,
    ) {
        loop {
            tokio::time::sleep(self.config.poll_interval).await;
            let outcome = match self.query_phase(&handle).await {
                Ok(report) => match report.outcome() {
                    Some(outcome) => outcome,
                    None => continue,
                },
                Err(BackendError::NotFound(_)) => {
                    // Vanished without a cancel: leave it to reconciliation
                    tracing::warn!(%handle, "kubernetes job disappeared");
                    return;
                }
                Err(e) => {
                    tracing::warn!(%handle, error = %e, "kubernetes job poll failed");
                    continue;
                }
            };
            tracing::info!(%handle, %outcome, "kubernetes job finished");
            if notices.send(CompletionNotice { job_id, handle, outcome }).await.is_err() {
                tracing::debug!("completion receiver dropped");
            }
            return;
        }
    }
}

fn parse_handle(handle: &BackendHandle) -> Result<(&str, &str), BackendError> {
    handle
        .as_str()
        .split_once('/')
        .filter(|(ns, name)| !ns.is_empty() && !name.is_empty())
        .ok_or_else(|| BackendError::NotFound(format!("malformed handle {handle}")))
}

fn is_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == code)
}

#[async_trait]
impl ComputeBackend for KubernetesBackend {
    async fn submit(
        &self,
        request: &SubmitRequest,
        notices: mpsc::Sender<CompletionNotice>,
    ) -> Result<BackendHandle, BackendError> {
        let name = spec::dns_label(&request.backend_name());
        let namespace = self.config.namespace.as_str();
        let job = spec::build_job(&JobParams {
            name: &name,
            namespace,
            image: &self.config.image,
            job_id: request.job_id.as_str(),
            service_account: self.config.service_account.as_deref(),
            env: request.worker_env(),
        });

        match self.jobs(namespace).create(&PostParams::default(), &job).await {
            Ok(_) => {}
            // A previous attempt created it but the dispatch was never recorded
            Err(e) if is_status(&e, 409) => {
                tracing::warn!(job_id = %request.job_id, %name, "kubernetes job already exists, adopting");
            }
            Err(e) => {
                return Err(BackendError::SubmitFailed(format!(
                    "failed to create job {}: {}",
                    name, e
                )))
            }
        }

        let handle = BackendHandle::new(format!("{namespace}/{name}"));
        tracing::info!(
            job_id = %request.job_id,
            %handle,
            image = %self.config.image,
            "kubernetes job created"
        );
        tokio::spawn(self.clone().watch(request.job_id.clone(), handle.clone(), notices));
        Ok(handle)
    }

    async fn query_phase(&self, handle: &BackendHandle) -> Result<PhaseReport, BackendError> {
        let (namespace, name) = parse_handle(handle)?;
        match self.jobs(namespace).get(name).await {
            Ok(job) => {
                let report = spec::report_from_job(&job);
                if !report.phase.is_terminal() && self.cancelled.lock().contains(handle) {
                    return Ok(PhaseReport::new(Phase::Cancelled));
                }
                Ok(report)
            }
            Err(e) if is_status(&e, 404) => {
                if self.cancelled.lock().contains(handle) {
                    Ok(PhaseReport::new(Phase::Cancelled))
                } else {
                    Err(BackendError::NotFound(handle.to_string()))
                }
            }
            Err(e) => Err(BackendError::QueryFailed(format!("get {}: {}", handle, e))),
        }
    }

    async fn cancel(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        let (namespace, name) = parse_handle(handle)?;
        self.cancelled.lock().insert(handle.clone());
        match self.jobs(namespace).delete(name, &DeleteParams::background()).await {
            Ok(_) => {
                tracing::info!(%handle, "kubernetes job deleted");
                Ok(())
            }
            Err(e) if is_status(&e, 404) => Err(BackendError::NotFound(handle.to_string())),
            Err(e) => {
                self.cancelled.lock().remove(handle);
                Err(BackendError::CancelFailed(format!("delete {}: {}", handle, e)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "kubernetes"
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
