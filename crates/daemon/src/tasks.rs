// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background tasks driving the engine between client requests.

use std::sync::Arc;
use std::time::Duration;

use onejob_adapters::{CompletionNotice, ComputeBackend};
use onejob_core::Clock;
use onejob_engine::{DispatchOutcome, Engine, NoticeOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Feed backend completion notices into the engine.
pub fn spawn_notice_pump<B, C>(
    engine: Arc<Engine<B, C>>,
    mut notices: mpsc::Receiver<CompletionNotice>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    B: ComputeBackend,
    C: Clock,
{
    tokio::spawn(async move {
        loop {
            let notice = tokio::select! {
                _ = cancel.cancelled() => break,
                notice = notices.recv() => match notice {
                    Some(notice) => notice,
                    None => break,
                },
            };
            let handle = notice.handle.clone();
            match engine.handle_notice(notice).await {
                Ok(NoticeOutcome::Finalized { id, outcome }) => {
                    info!(job_id = %id, %handle, %outcome, "job finalized from notice")
                }
                Ok(NoticeOutcome::Stale) => debug!(%handle, "stale completion notice"),
                Err(e) => error!(%handle, error = %e, "failed to handle completion notice"),
            }
        }
        debug!("notice pump stopped");
    })
}

/// Reconcile on a fixed interval.
pub fn spawn_reconciler<B, C>(
    engine: Arc<Engine<B, C>>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    B: ComputeBackend,
    C: Clock,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; startup already reconciled
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            match engine.reconcile().await {
                Ok(DispatchOutcome::Dispatched { id, handle }) => {
                    info!(job_id = %id, %handle, "reconcile dispatched job")
                }
                Ok(outcome) => debug!(?outcome, "reconcile pass complete"),
                Err(e) => error!(error = %e, "reconcile pass failed"),
            }
        }
        debug!("reconciler stopped");
    })
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
