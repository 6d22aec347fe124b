//! Worker-initiated messages built through generator handlers.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use courier_protocol::{Content, LogLevel};
//! use courier_worker::{TracingLogger, outbound};
//!
//! # fn main() -> Result<(), courier_worker::HandlerError> {
//! let logger = Arc::new(TracingLogger);
//! let opener = outbound::start_stream("worker-1", logger.clone())?;
//! assert!(matches!(opener.content(), Content::StartStream(_)));
//!
//! let record = outbound::rpc_log(Some("inv-7"), LogLevel::Warning, "slow start", logger)?;
//! assert_eq!(record.request_id(), "inv-7");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use courier_protocol::{LogLevel, Payload, RpcLog, StartStream, StreamingMessage};

use crate::handler::{HandlerError, HandlerLogger, MessageHandler, encode_payload};

/// Category stamped on log records the worker forwards to the host.
pub const LOG_CATEGORY: &str = "courier.worker";

/// Runs a generator cycle for `response` and returns the outbound envelope.
///
/// # Errors
///
/// Returns [`HandlerError::Encode`] if the envelope cannot be assembled.
pub fn generate_message<R>(
    request_id: &str,
    response: R,
    logger: Arc<dyn HandlerLogger>,
) -> Result<StreamingMessage, HandlerError>
where
    R: Payload + Send + Sync + 'static,
{
    let mut handler =
        MessageHandler::generate(move || response.clone(), encode_payload::<R>, logger)?;
    let mut builder = StreamingMessage::builder(request_id);
    handler.marshal_response(&mut builder)?;
    builder.build().map_err(HandlerError::Encode)
}

/// Builds the first message of a stream, announcing `worker_id`.
///
/// # Errors
///
/// Propagates failures from [`generate_message`].
pub fn start_stream(
    worker_id: &str,
    logger: Arc<dyn HandlerLogger>,
) -> Result<StreamingMessage, HandlerError> {
    let payload = StartStream {
        worker_id: worker_id.to_owned(),
    };
    generate_message("", payload, logger)
}

/// Builds a log record for the host.
///
/// The envelope carries the invocation id as its request id, or an empty id
/// for records not tied to an invocation.
///
/// # Errors
///
/// Propagates failures from [`generate_message`].
pub fn rpc_log(
    invocation_id: Option<&str>,
    level: LogLevel,
    message: impl Into<String>,
    logger: Arc<dyn HandlerLogger>,
) -> Result<StreamingMessage, HandlerError> {
    let payload = RpcLog {
        invocation_id: invocation_id.map(str::to_owned),
        category: LOG_CATEGORY.to_owned(),
        level,
        message: message.into(),
    };
    generate_message(invocation_id.unwrap_or_default(), payload, logger)
}
