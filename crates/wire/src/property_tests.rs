// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for protocol serde roundtrips.
//!
//! Covers every variant of Request and Response with arbitrary string fields.

use onejob_core::test_support::strategies::{arb_outcome, arb_status};
use onejob_core::{Job, Parameters};
use proptest::prelude::*;

use super::*;

fn arb_request() -> impl Strategy<Value = Request> {
    let text = "[a-z0-9/._-]{0,24}";
    prop_oneof![
        Just(Request::Ping),
        text.prop_map(|version| Request::Hello { version }),
        (text, 1u32..=100).prop_map(|(input_ref, n)| Request::Submit {
            input_ref,
            parameters: Parameters::new().with("maxIterations", n),
        }),
        text.prop_map(|id| Request::Status { id }),
        proptest::option::of(0usize..500).prop_map(|limit| Request::List { limit }),
        text.prop_map(|id| Request::Cancel { id }),
        text.prop_map(|id| Request::Results { id }),
        (text, arb_outcome()).prop_map(|(target, outcome)| Request::Complete { target, outcome }),
        text.prop_map(|id| Request::Logs { id }),
        Just(Request::DaemonStatus),
        Just(Request::Shutdown),
    ]
}

fn arb_response() -> impl Strategy<Value = Response> {
    let text = "[ -~]{0,32}";
    prop_oneof![
        Just(Response::Ok),
        Just(Response::Pong),
        Just(Response::ShuttingDown),
        text.prop_map(|version| Response::Hello { version }),
        (arb_status(), proptest::option::of(text)).prop_map(|(status, detail)| {
            let job = Job::builder().status(status).build();
            Response::Job {
                job: Box::new(JobDetail::with_overlay(&job, status, "m".into(), detail)),
            }
        }),
        proptest::collection::vec(arb_status(), 0..4).prop_map(|statuses| Response::Jobs {
            jobs: statuses
                .into_iter()
                .map(|s| JobSummary::from(&Job::builder().status(s).build()))
                .collect(),
        }),
        (text, proptest::collection::vec(text, 0..4))
            .prop_map(|(id, artifacts)| Response::Results { id, artifacts }),
        (text, proptest::collection::vec(text, 0..4))
            .prop_map(|(id, lines)| Response::JobLogs { id, lines }),
        (any::<u64>(), proptest::option::of(text), any::<u16>(), any::<u16>()).prop_map(
            |(uptime_secs, active, queued, total)| Response::Status {
                uptime_secs,
                active,
                queued: queued as usize,
                total: total as usize,
                backend: "process".into(),
            }
        ),
        (
            proptest::sample::select(vec![
                ErrorKind::Validation,
                ErrorKind::NotFound,
                ErrorKind::NotReady,
                ErrorKind::Internal,
            ]),
            text
        )
            .prop_map(|(kind, message)| Response::Error { kind, message }),
    ]
}

proptest! {
    #[test]
    fn request_roundtrips(request in arb_request()) {
        let decoded: Request = decode(&encode(&request).unwrap()).unwrap();
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn response_roundtrips(response in arb_response()) {
        let decoded: Response = decode(&encode(&response).unwrap()).unwrap();
        prop_assert_eq!(decoded, response);
    }
}
