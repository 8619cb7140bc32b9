// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend selected at daemon startup.

use super::{
    BackendError, CompletionNotice, ComputeBackend, KubernetesBackend, ProcessBackend,
    SubmitRequest,
};
use async_trait::async_trait;
use onejob_core::{BackendHandle, PhaseReport};
use tokio::sync::mpsc;

/// Delegates every call to the configured backend.
#[derive(Clone)]
pub enum BackendRouter {
    Process(ProcessBackend),
    Kubernetes(KubernetesBackend),
}

impl From<ProcessBackend> for BackendRouter {
    fn from(backend: ProcessBackend) -> Self {
        Self::Process(backend)
    }
}

impl From<KubernetesBackend> for BackendRouter {
    fn from(backend: KubernetesBackend) -> Self {
        Self::Kubernetes(backend)
    }
}

#[async_trait]
impl ComputeBackend for BackendRouter {
    async fn submit(
        &self,
        request: &SubmitRequest,
        notices: mpsc::Sender<CompletionNotice>,
    ) -> Result<BackendHandle, BackendError> {
        match self {
            Self::Process(b) => b.submit(request, notices).await,
            Self::Kubernetes(b) => b.submit(request, notices).await,
        }
    }

    async fn query_phase(&self, handle: &BackendHandle) -> Result<PhaseReport, BackendError> {
        match self {
            Self::Process(b) => b.query_phase(handle).await,
            Self::Kubernetes(b) => b.query_phase(handle).await,
        }
    }

    async fn cancel(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        match self {
            Self::Process(b) => b.cancel(handle).await,
            Self::Kubernetes(b) => b.cancel(handle).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Process(b) => b.name(),
            Self::Kubernetes(b) => b.name(),
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
