//! Wire types for the Courier worker protocol.
//!
//! The host and the worker exchange [`StreamingMessage`] envelopes over a
//! bidirectional JSONL stream. Every envelope carries a request id and exactly
//! one typed [`Content`] payload. Responses to host requests carry a uniform
//! [`StatusResult`] describing whether the worker-side logic succeeded.
//!
//! # Example
//!
//! ```
//! use courier_protocol::{Content, StreamingMessage, WorkerStatusResponse};
//!
//! let mut builder = StreamingMessage::builder("req-1");
//! builder.set_payload(WorkerStatusResponse::default());
//! let message = builder.build().expect("content was set");
//! assert_eq!(message.request_id(), "req-1");
//! assert!(matches!(message.content(), Content::WorkerStatusResponse(_)));
//! ```

pub mod codec;
pub mod content;
pub mod error;
pub mod message;
pub mod status;

pub use self::codec::MessageWriter;
pub use self::content::{
    Content, ContentKind, FunctionEnvironmentReloadRequest, FunctionEnvironmentReloadResponse,
    FunctionLoadRequest, FunctionLoadResponse, FunctionMetadata, LogLevel, Payload, RpcLog,
    StartStream, StatusCarrier, WorkerInitRequest, WorkerInitResponse, WorkerStatusRequest,
    WorkerStatusResponse,
};
pub use self::error::ProtocolError;
pub use self::message::{StreamingMessage, StreamingMessageBuilder};
pub use self::status::{RpcException, Status, StatusResult};
