// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket listener: one request and one response per connection.

use std::sync::Arc;
use std::time::Instant;

use onejob_adapters::ComputeBackend;
use onejob_core::{Clock, JobId};
use onejob_engine::{Engine, EngineError, NoticeOutcome};
use onejob_wire::{self as wire, ErrorKind, JobDetail, JobSummary, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::env::{ipc_timeout, PROTOCOL_VERSION};

/// Shared context for connection handlers.
pub struct ListenCtx<B: ComputeBackend, C: Clock> {
    pub engine: Arc<Engine<B, C>>,
    pub start_time: Instant,
    /// Notified when a client requests shutdown
    pub shutdown: Arc<Notify>,
}

pub struct Listener<B: ComputeBackend, C: Clock> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<B, C>>,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl<B, C> Listener<B, C>
where
    B: ComputeBackend,
    C: Clock,
{
    pub fn new(unix: UnixListener, ctx: ListenCtx<B, C>) -> Self {
        Self { unix, ctx: Arc::new(ctx) }
    }

    /// Accept connections until the task is dropped.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("Unix accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("Client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection.
///
/// Queries race against client disconnect so an abandoned poll does not
/// hold a task open. Requests that change state run on their own task and
/// complete even if the client goes away.
pub(crate) async fn handle_connection<R, W, B, C>(
    mut reader: R,
    mut writer: W,
    ctx: &Arc<ListenCtx<B, C>>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
    B: ComputeBackend,
    C: Clock,
{
    let request = wire::read_request(&mut reader, ipc_timeout()).await?;

    // Log queries at debug level (frequent polling), other requests at info
    let response = if request.is_query() {
        debug!(request = ?request, "received query");
        tokio::select! {
            response = handle_request(request, ctx) => response,
            _ = detect_client_disconnect(&mut reader) => {
                debug!("Client disconnected, dropping query");
                return Ok(());
            }
        }
    } else {
        info!(request = ?request, "received request");
        let ctx = Arc::clone(ctx);
        let mut task = tokio::spawn(async move { handle_request(request, &ctx).await });
        tokio::select! {
            joined = &mut task => joined.unwrap_or_else(|e| {
                error!(error = %e, "request handler panicked");
                Response::error(ErrorKind::Internal, "request handler failed")
            }),
            _ = detect_client_disconnect(&mut reader) => {
                debug!("Client disconnected, request continues in background");
                return Ok(());
            }
        }
    };

    debug!("Sending response: {:?}", response);
    wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// Resolves once the client closes its end after sending the request.
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

/// Handle a single request and return a response.
pub(crate) async fn handle_request<B, C>(request: Request, ctx: &ListenCtx<B, C>) -> Response
where
    B: ComputeBackend,
    C: Clock,
{
    let engine = &ctx.engine;
    let result = match request {
        Request::Ping => Ok(Response::Pong),

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                debug!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Ok(Response::Hello { version: PROTOCOL_VERSION.to_string() })
        }

        Request::Submit { input_ref, parameters } => engine
            .submit(&input_ref, parameters)
            .await
            .map(|job| Response::Job { job: Box::new(JobDetail::from_job(&job)) }),

        Request::Status { id } => engine.status(&id).await.map(|view| Response::Job {
            job: Box::new(JobDetail::with_overlay(
                &view.job,
                view.status,
                view.message,
                view.progress_detail,
            )),
        }),

        Request::List { limit } => Ok(Response::Jobs {
            jobs: engine.list(limit).iter().map(JobSummary::from).collect(),
        }),

        Request::Cancel { id } => engine
            .cancel(&id)
            .await
            .map(|job| Response::Job { job: Box::new(JobDetail::from_job(&job)) }),

        Request::Results { id } => engine
            .results(&id)
            .map(|(id, artifacts)| Response::Results { id: id.to_string(), artifacts }),

        Request::Complete { target, outcome } => {
            match engine.complete_external(&target, outcome).await {
                Ok(NoticeOutcome::Finalized { id, .. }) => Ok(job_response(ctx, &id)),
                Ok(NoticeOutcome::Stale) => {
                    debug!(%target, "external completion was stale");
                    let id = engine.store().read(|s| {
                        s.job_by_handle(&target.as_str().into())
                            .or_else(|| s.get_job(&target))
                            .map(|j| j.id.clone())
                    });
                    Ok(id.map(|id| job_response(ctx, &id)).unwrap_or(Response::Ok))
                }
                Err(e) => Err(e),
            }
        }

        Request::Logs { id } => engine
            .job_log(&id)
            .map(|(id, lines)| Response::JobLogs { id: id.to_string(), lines }),

        Request::DaemonStatus => {
            let summary = engine.summary();
            Ok(Response::Status {
                uptime_secs: ctx.start_time.elapsed().as_secs(),
                active: summary.active.map(|id| id.to_string()),
                queued: summary.queued,
                total: summary.total,
                backend: summary.backend.to_string(),
            })
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Ok(Response::ShuttingDown)
        }
    };

    result.unwrap_or_else(error_response)
}

fn job_response<B: ComputeBackend, C: Clock>(ctx: &ListenCtx<B, C>, id: &JobId) -> Response {
    match ctx.engine.store().get_job(id.as_str()) {
        Some(job) => Response::Job { job: Box::new(JobDetail::from_job(&job)) },
        None => Response::Ok,
    }
}

/// Map an engine error onto the client-visible error taxonomy.
pub(crate) fn error_response(e: EngineError) -> Response {
    let kind = match &e {
        EngineError::Validation(_) => ErrorKind::Validation,
        EngineError::NotFound(_) => ErrorKind::NotFound,
        EngineError::NotReady { .. } => ErrorKind::NotReady,
        EngineError::Store(_) | EngineError::Backend(_) | EngineError::Conflict(_) => {
            error!(error = %e, "request failed");
            ErrorKind::Internal
        }
    };
    Response::error(kind, e.to_string())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
