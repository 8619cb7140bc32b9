// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! onejob-core: Job records, the status state machine, and the events that
//! mutate them.

pub mod macros;

pub mod clock;
pub mod event;
pub mod id;
pub mod job;
pub mod params;
pub mod phase;
pub mod status;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::Event;
pub use id::short;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{display_message, BackendHandle, Job, JobId, Outcome};
pub use params::{validate_input_ref, EffectiveParameters, Parameters, ValidationError};
pub use phase::{Phase, PhaseReport};
pub use status::{JobStatus, TransitionError};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
