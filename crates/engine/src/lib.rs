// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! onejob-engine: submission, dispatch, completion, cancellation and
//! status over the job store and a compute backend.

mod error;
mod job_logger;
mod runtime;

pub use error::EngineError;
pub use job_logger::JobLogger;
pub use runtime::{
    DispatchOutcome, Engine, EngineConfig, EngineSummary, JobView, NoticeOutcome,
};
