// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use onejob_core::{JobId, Outcome};
use std::time::Duration;

#[tokio::test]
async fn process_route_delegates_submit_and_query() {
    let router = BackendRouter::from(ProcessBackend::new(
        "sh",
        vec!["-c".to_string(), "echo 'artifact out.xlsx'".to_string()],
    ));
    assert_eq!(router.name(), "process");

    let (tx, mut rx) = mpsc::channel(1);
    let request = SubmitRequest::new(JobId::from_string("job-r1"), "in.xlsx");
    let handle = router.submit(&request, tx).await.unwrap();

    let notice = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await.unwrap().unwrap();
    assert_eq!(notice.outcome, Outcome::Succeeded { artifacts: vec!["out.xlsx".to_string()] });
    assert!(router.query_phase(&handle).await.unwrap().phase.is_terminal());
}
