// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! onejob daemon library
//!
//! Owns the job store and engine, serves the IPC socket, and runs the
//! background notice pump and reconciliation timer.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod tasks;

pub use config::{Config, Settings};
pub use lifecycle::{startup, DaemonEngine, DaemonState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
