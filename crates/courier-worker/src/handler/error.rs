//! Framework errors surfaced by handler operations.
//!
//! Business failures inside `execute` never appear here; they are reported
//! through the response status instead.

use courier_protocol::ProtocolError;
use thiserror::Error;

/// Errors that escape a handler cycle.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The inbound envelope could not be decoded into the handler's request.
    #[error("failed to decode request: {0}")]
    Decode(#[source] ProtocolError),

    /// A request was supplied to a handler that only generates messages.
    #[error("handler has no request decoder")]
    NoDecoder,

    /// Building or injecting the status envelope failed.
    #[error("failed to inject response status: {0}")]
    StatusInjection(#[source] ProtocolError),

    /// Writing the response into the outbound envelope failed.
    #[error("failed to encode response: {0}")]
    Encode(#[source] ProtocolError),
}
