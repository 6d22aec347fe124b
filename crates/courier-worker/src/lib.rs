//! Message-dispatch core of the Courier out-of-process worker.
//!
//! The worker receives [`StreamingMessage`](courier_protocol::StreamingMessage)
//! envelopes from its host, turns each one into a typed request, runs the
//! business logic for that message kind and answers with a typed response
//! carrying a uniform [`StatusResult`](courier_protocol::StatusResult).
//!
//! # Architecture
//!
//! - [`handler::MessageHandler`] drives one decode → execute → status → encode
//!   cycle at a time. It is parameterised by a [`handler::Marshalling`] value
//!   (the collaborator functions) and an [`handler::Execute`] variant (the
//!   business logic). Business failures become a failure status; they never
//!   escape `handle`.
//! - [`handler::Generator`] synthesises worker-initiated messages with no
//!   inbound request.
//! - [`operations`] holds the built-in variants.
//! - [`outbound`] builds worker-initiated messages such as `start_stream`.
//! - [`dispatch::Dispatcher`] routes envelopes to handler instances.
//! - [`session::run_session`] pumps a JSONL stream through the dispatcher.

pub mod config;
pub mod dispatch;
pub mod handler;
pub mod operations;
pub mod outbound;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::config::{ConfigError, LogFormat, WorkerConfig};
pub use self::dispatch::{CycleHandler, DispatchError, Dispatcher};
pub use self::handler::{
    BoxTask, CycleState, Execute, Generator, HandlerError, HandlerLogger, Marshalling,
    MessageHandler, TracingLogger,
};
pub use self::session::{SessionError, SessionSummary, run_session};
