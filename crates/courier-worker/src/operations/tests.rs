//! Unit tests for the built-in variants.

use std::collections::BTreeMap;
use std::sync::Arc;

use courier_protocol::{
    Content, FunctionEnvironmentReloadRequest, FunctionEnvironmentReloadResponse,
    FunctionLoadRequest, FunctionLoadResponse, FunctionMetadata, StatusCarrier, StatusResult,
    StreamingMessage, WorkerInitRequest, WorkerInitResponse, WorkerStatusRequest,
    WorkerStatusResponse,
};
use rstest::{fixture, rstest};

use super::*;
use crate::tests::support::RecordingLogger;

#[fixture]
fn logger() -> Arc<RecordingLogger> {
    RecordingLogger::shared()
}

fn metadata(name: &str) -> FunctionMetadata {
    FunctionMetadata {
        name: name.to_owned(),
        directory: String::from("/home/site/wwwroot"),
        script_file: String::from("app.wasm"),
        entry_point: String::from("run"),
    }
}

fn load_message(function_id: &str, metadata: FunctionMetadata) -> StreamingMessage {
    StreamingMessage::new(
        "load-1",
        Content::FunctionLoadRequest(FunctionLoadRequest {
            function_id: function_id.to_owned(),
            metadata,
        }),
    )
}

fn run_cycle<E>(handler: &mut MessageHandler<E>, message: &StreamingMessage)
where
    E: Execute,
{
    handler.set_request(message).expect("decode");
    handler.handle().expect("handle");
}

fn status<R: StatusCarrier>(response: &R) -> &StatusResult {
    response.result().expect("status injected")
}

// ---------------------------------------------------------------------------
// Worker init
// ---------------------------------------------------------------------------

#[rstest]
fn worker_init_advertises_version_and_capabilities(logger: Arc<RecordingLogger>) {
    let mut handler = payload_handler(WorkerInitHandler::new("1.2.3"), logger.clone());
    let message = StreamingMessage::new(
        "init",
        Content::WorkerInitRequest(WorkerInitRequest {
            host_version: String::from("4.0.0"),
            capabilities: BTreeMap::new(),
        }),
    );
    run_cycle(&mut handler, &message);

    let response: &WorkerInitResponse = handler.response();
    assert!(status(response).is_success());
    assert_eq!(response.worker_version, "1.2.3");
    assert_eq!(
        response
            .capabilities
            .get(CAPABILITY_STATUS_ENVELOPE)
            .map(String::as_str),
        Some("true")
    );
    assert_eq!(
        logger.infos(),
        vec![String::from("worker 1.2.3 initialised for host 4.0.0")]
    );
}

#[rstest]
fn worker_init_rejects_blank_host_version(logger: Arc<RecordingLogger>) {
    let mut handler = payload_handler(WorkerInitHandler::default(), logger);
    let message = StreamingMessage::new(
        "init",
        Content::WorkerInitRequest(WorkerInitRequest::default()),
    );
    run_cycle(&mut handler, &message);

    let result = status(handler.response());
    assert!(!result.is_success());
    assert_eq!(result.result(), "host version must not be empty");
    assert!(handler.response().worker_version.is_empty());
}

// ---------------------------------------------------------------------------
// Worker status
// ---------------------------------------------------------------------------

#[rstest]
fn worker_status_replies_with_empty_success(logger: Arc<RecordingLogger>) {
    let mut handler = payload_handler(WorkerStatusHandler, logger.clone());
    let message = StreamingMessage::new(
        "ping",
        Content::WorkerStatusRequest(WorkerStatusRequest {}),
    );
    run_cycle(&mut handler, &message);

    let response: &WorkerStatusResponse = handler.response();
    assert_eq!(status(response), &StatusResult::success(""));
    assert!(logger.entries().is_empty());
}

// ---------------------------------------------------------------------------
// Function load
// ---------------------------------------------------------------------------

#[rstest]
fn function_load_records_metadata(logger: Arc<RecordingLogger>) {
    let catalog = FunctionCatalog::new();
    let mut handler = payload_handler(FunctionLoadHandler::new(catalog.clone()), logger);
    run_cycle(&mut handler, &load_message("fn-1", metadata("resize")));

    let response: &FunctionLoadResponse = handler.response();
    assert_eq!(response.function_id, "fn-1");
    assert_eq!(status(response).result(), "function \"resize\" loaded as fn-1");
    assert_eq!(
        catalog.get("fn-1").expect("lookup"),
        Some(metadata("resize"))
    );
}

#[rstest]
fn function_load_is_idempotent_for_identical_definitions(logger: Arc<RecordingLogger>) {
    let catalog = FunctionCatalog::new();
    let mut handler = payload_handler(FunctionLoadHandler::new(catalog.clone()), logger);
    run_cycle(&mut handler, &load_message("fn-1", metadata("resize")));
    run_cycle(&mut handler, &load_message("fn-1", metadata("resize")));

    assert_eq!(
        status(handler.response()).result(),
        "function \"resize\" already loaded as fn-1"
    );
    assert_eq!(catalog.len().expect("len"), 1);
}

#[rstest]
fn function_load_conflict_is_reported_as_failure(logger: Arc<RecordingLogger>) {
    let catalog = FunctionCatalog::new();
    let mut handler = payload_handler(FunctionLoadHandler::new(catalog.clone()), logger.clone());
    run_cycle(&mut handler, &load_message("fn-1", metadata("resize")));
    run_cycle(&mut handler, &load_message("fn-1", metadata("crop")));

    let result = status(handler.response());
    assert!(!result.is_success());
    assert_eq!(
        result.result(),
        "function 'fn-1' is already loaded with a different definition"
    );
    assert_eq!(handler.response().function_id, "fn-1");
    assert_eq!(logger.errors().len(), 1);
    assert_eq!(
        catalog.get("fn-1").expect("lookup"),
        Some(metadata("resize"))
    );
}

#[rstest]
#[case::blank_id("  ", metadata("resize"), "function_id")]
#[case::blank_name("fn-2", metadata(""), "name")]
#[case::blank_entry_point(
    "fn-3",
    FunctionMetadata { entry_point: String::new(), ..metadata("resize") },
    "entry_point"
)]
fn function_load_rejects_incomplete_metadata(
    logger: Arc<RecordingLogger>,
    #[case] function_id: &str,
    #[case] definition: FunctionMetadata,
    #[case] field: &str,
) {
    let catalog = FunctionCatalog::new();
    let mut handler = payload_handler(FunctionLoadHandler::new(catalog.clone()), logger);
    run_cycle(&mut handler, &load_message(function_id, definition));

    let result = status(handler.response());
    assert!(!result.is_success());
    assert!(
        result.result().contains(field),
        "expected '{field}' in '{}'",
        result.result()
    );
    assert!(catalog.is_empty().expect("is_empty"));
}

// ---------------------------------------------------------------------------
// Environment reload
// ---------------------------------------------------------------------------

fn reload_message(directory: &str, variables: &[(&str, &str)]) -> StreamingMessage {
    StreamingMessage::new(
        "reload",
        Content::FunctionEnvironmentReloadRequest(FunctionEnvironmentReloadRequest {
            function_app_directory: directory.to_owned(),
            environment_variables: variables
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
        }),
    )
}

#[rstest]
fn environment_reload_applies_directory_and_variables(logger: Arc<RecordingLogger>) {
    let mut handler = payload_handler(EnvironmentReloadHandler::default(), logger);
    run_cycle(
        &mut handler,
        &reload_message(" /srv/app ", &[("REGION", "eu"), ("TIER", "free")]),
    );

    let response: &FunctionEnvironmentReloadResponse = handler.response();
    assert_eq!(
        status(response).result(),
        "environment reloaded from /srv/app with 2 variables"
    );
    let current = handler.executor().current().expect("environment applied");
    assert_eq!(current.directory, "/srv/app");
    assert_eq!(current.variables.get("REGION").map(String::as_str), Some("eu"));
}

#[rstest]
fn environment_reload_keeps_previous_environment_on_failure(logger: Arc<RecordingLogger>) {
    let mut handler = payload_handler(EnvironmentReloadHandler::default(), logger);
    run_cycle(&mut handler, &reload_message("/srv/app", &[]));
    run_cycle(&mut handler, &reload_message("", &[]));

    assert_eq!(
        status(handler.response()).result(),
        "function app directory must not be empty"
    );
    assert_eq!(
        handler.executor().current().map(|env| env.directory.as_str()),
        Some("/srv/app")
    );
}
