//! Unit tests for the payload catalogue.

use std::str::FromStr;

use rstest::rstest;

use super::*;
use crate::status::RpcException;

#[test]
fn content_is_tagged_by_kind() {
    let content = Content::StartStream(StartStream {
        worker_id: String::from("worker-1"),
    });
    let json = serde_json::to_string(&content).expect("serialise");
    assert_eq!(json, r#"{"kind":"start_stream","worker_id":"worker-1"}"#);
}

#[test]
fn empty_payload_parses_from_kind_alone() {
    let content: Content =
        serde_json::from_str(r#"{"kind":"worker_status_request"}"#).expect("parse");
    assert_eq!(content, Content::WorkerStatusRequest(WorkerStatusRequest {}));
}

#[test]
fn unknown_kind_is_rejected() {
    let result = serde_json::from_str::<Content>(r#"{"kind":"invocation_request"}"#);
    assert!(result.is_err());
}

#[rstest]
#[case::init(Content::WorkerInitRequest(WorkerInitRequest::default()), "worker_init_request")]
#[case::load(
    Content::FunctionLoadResponse(FunctionLoadResponse::default()),
    "function_load_response"
)]
#[case::reload(
    Content::FunctionEnvironmentReloadRequest(FunctionEnvironmentReloadRequest::default()),
    "function_environment_reload_request"
)]
#[case::log(Content::RpcLog(RpcLog::default()), "rpc_log")]
fn kind_names_match_serde_tags(#[case] content: Content, #[case] expected: &str) {
    assert_eq!(content.kind().to_string(), expected);
    let value = serde_json::to_value(&content).expect("serialise");
    assert_eq!(value["kind"], expected);
    assert_eq!(ContentKind::from_str(expected).expect("parse kind"), content.kind());
}

#[test]
fn payload_extracts_matching_variant_only() {
    let content = WorkerStatusRequest {}.into_content();
    assert!(WorkerStatusRequest::from_content(&content).is_some());
    assert!(WorkerInitRequest::from_content(&content).is_none());
    assert_eq!(WorkerStatusRequest::KIND, ContentKind::WorkerStatusRequest);
}

#[test]
fn status_carrier_replaces_result() {
    let mut response = FunctionLoadResponse::default();
    assert!(response.result().is_none());

    response.set_result(StatusResult::success("first"));
    response.set_result(StatusResult::failure(
        "second",
        RpcException::new("second", "0: second"),
    ));

    let result = response.result().expect("status attached");
    assert!(!result.is_success());
    assert_eq!(result.result(), "second");
}

#[test]
fn unset_status_is_omitted_on_the_wire() {
    let json = serde_json::to_string(&WorkerStatusResponse::default().into_content())
        .expect("serialise");
    assert_eq!(json, r#"{"kind":"worker_status_response"}"#);
}
