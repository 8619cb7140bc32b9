// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use onejob_adapters::BackendError;
use onejob_core::{JobStatus, ValidationError};
use onejob_storage::{Conflict, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("results not ready: job is {status}")]
    NotReady { status: JobStatus },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("unexpected conflict: {0}")]
    Conflict(#[from] Conflict),
}
