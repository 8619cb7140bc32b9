// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{BackendHandle, Event, JobId, Outcome, Parameters};

// ── Proptest strategies ─────────────────────────────────────────────────

pub mod strategies {
    use crate::{JobStatus, Outcome};
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = JobStatus> {
        proptest::sample::select(JobStatus::ALL.to_vec())
    }

    pub fn arb_outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![
            proptest::collection::vec("[a-z]{1,8}\\.xlsx", 0..3)
                .prop_map(|artifacts| Outcome::Succeeded { artifacts }),
            "[a-z ]{1,16}".prop_map(|reason| Outcome::Failed { reason }),
            Just(Outcome::Cancelled),
        ]
    }
}

// ── Event factory functions ─────────────────────────────────────────────

pub fn created(id: &str) -> Event {
    Event::JobCreated {
        id: JobId::from_string(id),
        input_ref: format!("uploads/{id}.xlsx"),
        parameters: Parameters::new(),
        submitted_at_ms: 1_000_000,
    }
}

pub fn admitted(id: &str) -> Event {
    Event::JobAdmitted { id: JobId::from_string(id), admitted_at_ms: 1_000_100 }
}

pub fn dispatched(id: &str, handle: &str) -> Event {
    Event::JobDispatched {
        id: JobId::from_string(id),
        handle: BackendHandle::new(handle),
        started_at_ms: 1_000_200,
    }
}

pub fn requeued(id: &str, error: &str) -> Event {
    Event::JobRequeued { id: JobId::from_string(id), error: error.to_string() }
}

pub fn completed(id: &str, outcome: Outcome) -> Event {
    Event::JobCompleted { id: JobId::from_string(id), outcome, completed_at_ms: 1_000_900 }
}

pub fn withdrawn(id: &str) -> Event {
    Event::JobWithdrawn { id: JobId::from_string(id), completed_at_ms: 1_000_300 }
}

pub fn succeeded(artifacts: &[&str]) -> Outcome {
    Outcome::Succeeded { artifacts: artifacts.iter().map(|s| s.to_string()).collect() }
}
