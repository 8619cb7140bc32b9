// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `onejobd`: the onejob daemon.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use onejob_daemon::{env, logging, startup, tasks, Config, ListenCtx, Listener, StartupResult};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Time for in-flight responses (e.g. `ShuttingDown`) to reach clients.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("onejobd: {e}");
            // Still leave the reason where `onejob daemon start` looks for it
            if let Ok(state_dir) = env::state_dir() {
                let log_path = state_dir.join("daemon.log");
                if logging::write_startup_marker(&log_path).is_ok() {
                    logging::write_startup_error(&log_path, &e);
                }
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::write_startup_marker(&config.log_path) {
        eprintln!("onejobd: cannot write {}: {e}", config.log_path.display());
        return ExitCode::FAILURE;
    }
    let _guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("onejobd: failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "daemon exited with error");
            logging::write_startup_error(&config.log_path, &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), onejob_daemon::LifecycleError> {
    let StartupResult { mut daemon, listener, notices } = startup(&config).await?;
    let engine = Arc::clone(&daemon.engine);

    match engine.recover().await {
        Ok(outcome) => info!(?outcome, "startup recovery complete"),
        Err(e) => warn!(error = %e, "startup recovery failed; reconciliation will retry"),
    }

    let cancel = CancellationToken::new();
    let pump = tasks::spawn_notice_pump(Arc::clone(&engine), notices, cancel.clone());
    let reconciler = tasks::spawn_reconciler(
        Arc::clone(&engine),
        config.settings.reconcile_interval(),
        cancel.clone(),
    );

    let shutdown = Arc::new(Notify::new());
    let ctx = ListenCtx {
        engine: Arc::clone(&engine),
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
    };
    let accept = tokio::spawn(Listener::new(listener, ctx).run());
    info!(socket = %config.socket_path.display(), "listening");

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = shutdown.notified() => {
            info!("shutdown requested by client");
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        }
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = sigterm.recv() => info!("received SIGTERM"),
    }

    accept.abort();
    cancel.cancel();
    let _ = pump.await;
    let _ = reconciler.await;
    daemon.shutdown()
}
