// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::JobStatus;
use tokio::net::UnixListener;

const TIMEOUT: Duration = Duration::from_secs(1);

/// Serve one connection: record the request, answer with `response`.
fn serve_once(
    dir: &tempfile::TempDir,
    response: Response,
) -> (DaemonClient, tokio::task::JoinHandle<Request>) {
    let path = dir.path().join("daemon.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let request = wire::read_request(&mut reader, TIMEOUT).await.unwrap();
        wire::write_response(&mut writer, &response, TIMEOUT).await.unwrap();
        request
    });
    (DaemonClient::for_socket(path, TIMEOUT).unwrap(), server)
}

fn detail(status: JobStatus) -> JobDetail {
    serde_json::from_value(serde_json::json!({
        "id": "job-abc",
        "status": status,
        "input_ref": "a.xlsx",
        "message": "Queued...",
        "submitted_at_ms": 1,
    }))
    .unwrap()
}

#[test]
fn missing_socket_is_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let err = DaemonClient::for_socket(dir.path().join("daemon.sock"), TIMEOUT).err().unwrap();
    assert!(err.is_not_running());
}

#[tokio::test]
async fn submit_sends_request_and_returns_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (client, server) =
        serve_once(&dir, Response::Job { job: Box::new(detail(JobStatus::Pending)) });

    let params = Parameters::new().with("maxIterations", 4);
    let job = client.submit("a.xlsx", params.clone()).await.unwrap();
    assert_eq!(job.id, "job-abc");
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(
        server.await.unwrap(),
        Request::Submit { input_ref: "a.xlsx".into(), parameters: params }
    );
}

#[tokio::test]
async fn error_response_becomes_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _server) =
        serve_once(&dir, Response::error(ErrorKind::NotReady, "results not ready: job is running"));

    match client.results("job-abc").await {
        Err(ClientError::Rejected { kind, message }) => {
            assert_eq!(kind, ErrorKind::NotReady);
            assert!(message.contains("not ready"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn mismatched_response_is_unexpected() {
    let dir = tempfile::tempdir().unwrap();
    let (client, _server) = serve_once(&dir, Response::Pong);
    let err = client.list(None).await.unwrap_err();
    assert!(matches!(err, ClientError::Unexpected(_)));
}

#[tokio::test]
async fn complete_without_job_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (client, server) = serve_once(&dir, Response::Ok);
    let shown = client.complete("proc-1", Outcome::Cancelled).await.unwrap();
    assert_eq!(shown, None);
    assert_eq!(
        server.await.unwrap(),
        Request::Complete { target: "proc-1".into(), outcome: Outcome::Cancelled }
    );
}

#[tokio::test]
async fn stale_socket_file_is_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    // Bound then dropped: the file stays but nobody listens
    drop(UnixListener::bind(&path).unwrap());

    let client = DaemonClient::for_socket(path, TIMEOUT).unwrap();
    assert!(client.ping().await.unwrap_err().is_not_running());
}
