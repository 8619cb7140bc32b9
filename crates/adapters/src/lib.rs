// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! onejob-adapters: compute backends that execute admitted jobs.

pub mod backend;

pub use backend::{
    BackendError, BackendRouter, CompletionNotice, ComputeBackend, KubernetesBackend,
    KubernetesConfig, ProcessBackend, SubmitRequest,
};

#[cfg(any(test, feature = "test-support"))]
pub use backend::{BackendCall, FakeBackend};
