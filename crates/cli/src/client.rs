// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the daemon's Unix socket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use onejob_core::{Outcome, Parameters};
use onejob_wire::{self as wire, ErrorKind, JobDetail, JobSummary, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (start it with `onejob daemon start`)")]
    DaemonNotRunning,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },
    #[error("unexpected response from daemon: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::DaemonNotRunning)
    }
}

/// Daemon status as reported by `DaemonStatus`
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub active: Option<String>,
    pub queued: usize,
    pub total: usize,
    pub backend: String,
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Client for the daemon under the resolved state directory.
    ///
    /// Fails fast when no socket file exists.
    pub fn connect() -> Result<Self, ClientError> {
        let state_dir = crate::env::state_dir().map_err(|_| ClientError::DaemonNotRunning)?;
        Self::for_socket(state_dir.join("daemon.sock"), crate::env::ipc_timeout())
    }

    pub fn for_socket(socket_path: PathBuf, timeout: Duration) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path, timeout })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// One request/response exchange on a fresh connection.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                    ClientError::DaemonNotRunning
                }
                _ => ClientError::Protocol(ProtocolError::Io(e)),
            }
        })?;
        let (mut reader, mut writer) = stream.into_split();
        wire::write_request(&mut writer, request, self.timeout).await?;
        Ok(wire::read_response(&mut reader, self.timeout).await?)
    }

    /// Turn an unexpected response into an error.
    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { kind, message } => Err(ClientError::Rejected { kind, message }),
            other => Err(ClientError::Unexpected(format!("{:?}", other))),
        }
    }

    async fn send_for_job(&self, request: Request) -> Result<JobDetail, ClientError> {
        match self.send(&request).await? {
            Response::Job { job } => Ok(*job),
            other => Self::reject(other),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: env!("CARGO_PKG_VERSION").to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn submit(
        &self,
        input_ref: &str,
        parameters: Parameters,
    ) -> Result<JobDetail, ClientError> {
        self.send_for_job(Request::Submit { input_ref: input_ref.to_string(), parameters }).await
    }

    pub async fn status(&self, id: &str) -> Result<JobDetail, ClientError> {
        self.send_for_job(Request::Status { id: id.to_string() }).await
    }

    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<JobSummary>, ClientError> {
        match self.send(&Request::List { limit }).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    pub async fn cancel(&self, id: &str) -> Result<JobDetail, ClientError> {
        self.send_for_job(Request::Cancel { id: id.to_string() }).await
    }

    pub async fn results(&self, id: &str) -> Result<(String, Vec<String>), ClientError> {
        match self.send(&Request::Results { id: id.to_string() }).await? {
            Response::Results { id, artifacts } => Ok((id, artifacts)),
            other => Self::reject(other),
        }
    }

    /// Report a terminal outcome. `None` means the daemon had nothing to show.
    pub async fn complete(
        &self,
        target: &str,
        outcome: Outcome,
    ) -> Result<Option<JobDetail>, ClientError> {
        let request = Request::Complete { target: target.to_string(), outcome };
        match self.send(&request).await? {
            Response::Job { job } => Ok(Some(*job)),
            Response::Ok => Ok(None),
            other => Self::reject(other),
        }
    }

    pub async fn job_logs(&self, id: &str) -> Result<(String, Vec<String>), ClientError> {
        match self.send(&Request::Logs { id: id.to_string() }).await? {
            Response::JobLogs { id, lines } => Ok((id, lines)),
            other => Self::reject(other),
        }
    }

    pub async fn daemon_status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::DaemonStatus).await? {
            Response::Status { uptime_secs, active, queued, total, backend } => {
                Ok(DaemonStatus { uptime_secs, active, queued, total, backend })
            }
            other => Self::reject(other),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
