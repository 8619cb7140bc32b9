// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::JobId;
use std::time::Duration;

fn sh(script: &str) -> ProcessBackend {
    ProcessBackend::new("sh", vec!["-c".to_string(), script.to_string()])
}

fn request() -> SubmitRequest {
    SubmitRequest::new(JobId::from_string("job-t1"), "uploads/in.xlsx")
        .env(vec![("MAX_ITERATIONS".to_string(), "7".to_string())])
}

async fn next_notice(rx: &mut mpsc::Receiver<CompletionNotice>) -> CompletionNotice {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("notice timed out")
        .expect("channel closed")
}

#[tokio::test]
async fn successful_worker_reports_artifacts_from_stdout() {
    let backend = sh("echo \"artifact results/$JOB_ID.xlsx\"; echo noise; echo \"artifact iter-$MAX_ITERATIONS\"");
    let (tx, mut rx) = mpsc::channel(4);

    let handle = backend.submit(&request(), tx).await.unwrap();
    assert!(handle.as_str().starts_with("proc-"));

    let notice = next_notice(&mut rx).await;
    assert_eq!(notice.handle, handle);
    assert_eq!(notice.job_id, JobId::from_string("job-t1"));
    assert_eq!(
        notice.outcome,
        Outcome::Succeeded {
            artifacts: vec!["results/job-t1.xlsx".to_string(), "iter-7".to_string()]
        }
    );

    let report = backend.query_phase(&handle).await.unwrap();
    assert_eq!(report.phase, Phase::Succeeded);
}

#[tokio::test]
async fn nonzero_exit_is_failure_with_stderr_tail() {
    let backend = sh("echo 'input missing' >&2; exit 3");
    let (tx, mut rx) = mpsc::channel(4);
    let handle = backend.submit(&request(), tx).await.unwrap();

    let notice = next_notice(&mut rx).await;
    assert_eq!(
        notice.outcome,
        Outcome::Failed { reason: "worker exited with status 3: input missing".to_string() }
    );
    let report = backend.query_phase(&handle).await.unwrap();
    assert_eq!(report.phase, Phase::Failed);
    assert_eq!(report.reason.as_deref(), Some("worker exited with status 3: input missing"));
}

#[tokio::test]
async fn progress_lines_surface_as_detail() {
    let backend = sh("echo 'progress iteration 2/3'; sleep 30");
    let (tx, mut rx) = mpsc::channel(4);
    let handle = backend.submit(&request(), tx).await.unwrap();

    let mut detail = None;
    for _ in 0..100 {
        let report = backend.query_phase(&handle).await.unwrap();
        if report.detail.is_some() {
            detail = report.detail;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(detail.as_deref(), Some("iteration 2/3"));
    assert_eq!(backend.query_phase(&handle).await.unwrap().phase, Phase::Running);

    backend.cancel(&handle).await.unwrap();
    assert_eq!(next_notice(&mut rx).await.outcome, Outcome::Cancelled);
}

#[tokio::test]
async fn cancel_kills_running_worker() {
    let backend = sh("sleep 30");
    let (tx, mut rx) = mpsc::channel(4);
    let handle = backend.submit(&request(), tx).await.unwrap();

    backend.cancel(&handle).await.unwrap();
    let notice = next_notice(&mut rx).await;
    assert_eq!(notice.outcome, Outcome::Cancelled);
    assert_eq!(backend.query_phase(&handle).await.unwrap().phase, Phase::Cancelled);
}

#[tokio::test]
async fn spawn_failure_is_submit_error() {
    let backend = ProcessBackend::new("/nonexistent/onejob-worker", vec![]);
    let (tx, _rx) = mpsc::channel(1);
    let err = backend.submit(&request(), tx).await.unwrap_err();
    assert!(matches!(err, BackendError::SubmitFailed(_)), "{err:?}");
}

#[tokio::test]
async fn unknown_handle_is_not_found() {
    let backend = sh("true");
    let handle = BackendHandle::new("proc-missing");
    assert!(matches!(backend.query_phase(&handle).await, Err(BackendError::NotFound(_))));
    assert!(matches!(backend.cancel(&handle).await, Err(BackendError::NotFound(_))));
}

#[test]
fn command_line_splits_on_whitespace() {
    let backend = ProcessBackend::from_command_line("python3 -m worker  --fast").unwrap();
    assert_eq!(backend.program, "python3");
    assert_eq!(backend.args, ["-m", "worker", "--fast"]);
    assert!(ProcessBackend::from_command_line("   ").is_err());
}

#[tokio::test]
async fn finished_runs_are_evicted_beyond_retention() {
    let backend = sh("true").with_retention(2);
    let (tx, mut rx) = mpsc::channel(8);

    let mut handles = Vec::new();
    for _ in 0..3 {
        let handle = backend.submit(&request(), tx.clone()).await.unwrap();
        next_notice(&mut rx).await;
        handles.push(handle);
    }

    assert!(matches!(
        backend.query_phase(&handles[0]).await,
        Err(BackendError::NotFound(_))
    ));
    for handle in &handles[1..] {
        assert_eq!(backend.query_phase(handle).await.unwrap().phase, Phase::Succeeded);
    }
    assert_eq!(backend.runs.lock().runs.len(), 2);
}

#[tokio::test]
async fn live_runs_are_never_evicted() {
    let backend = sh("true").with_retention(0);
    let slow = ProcessBackend::new("sh", vec!["-c".to_string(), "sleep 30".to_string()]);
    let slow = ProcessBackend { runs: Arc::clone(&backend.runs), ..slow };
    let (tx, mut rx) = mpsc::channel(8);

    let running = slow.submit(&request(), tx.clone()).await.unwrap();
    let done = backend.submit(&request(), tx).await.unwrap();
    assert_eq!(next_notice(&mut rx).await.handle, done);

    assert!(matches!(backend.query_phase(&done).await, Err(BackendError::NotFound(_))));
    assert_eq!(backend.query_phase(&running).await.unwrap().phase, Phase::Running);

    backend.cancel(&running).await.unwrap();
    assert_eq!(next_notice(&mut rx).await.outcome, Outcome::Cancelled);
}
