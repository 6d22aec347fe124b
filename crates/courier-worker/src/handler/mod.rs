//! Generic decode → execute → status → encode pipeline.
//!
//! A [`MessageHandler`] owns at most one in-flight request/response pair. The
//! dispatcher drives it through [`MessageHandler::set_request`],
//! [`MessageHandler::handle`] and [`MessageHandler::marshal_response`], in
//! that order, once per inbound message:
//!
//! ```text
//! Empty ──set_request──▶ RequestSet ──handle──▶ Handled ──marshal_response──▶ Marshaled
//! ```
//!
//! Any error returned by the variant's [`Execute::execute`] is converted into
//! a failure [`StatusResult`] inside `handle` and nowhere else. Only framework
//! errors (decode, status injection, encode) leave the handler as
//! [`HandlerError`].
//!
//! A handler is driven by one caller at a time; every operation takes
//! `&mut self` and there is no internal locking.

mod error;
mod generator;
mod logger;
mod marshalling;

use std::backtrace::BacktraceStatus;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use courier_protocol::{RpcException, StatusResult, StreamingMessage, StreamingMessageBuilder};

pub use self::error::HandlerError;
pub use self::generator::{Generator, generated_message};
pub use self::logger::{HandlerLogger, TracingLogger};
pub use self::marshalling::{Marshalling, decode_payload, encode_payload};

#[cfg(test)]
pub(crate) use self::logger::MockHandlerLogger;

/// An asynchronous unit of work spawned while handling a message.
pub type BoxTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Business logic for one message kind.
pub trait Execute {
    /// Decoded request type.
    type Request;
    /// Response type produced by the cycle.
    type Response;

    /// Runs the business logic for one request.
    ///
    /// The response starts in its freshly made state and may be mutated. The
    /// returned message, when present and non-empty, is logged and becomes
    /// the status message.
    ///
    /// # Errors
    ///
    /// Any error is reported to the host as a failure status.
    fn execute(
        &mut self,
        request: &Self::Request,
        response: &mut Self::Response,
    ) -> anyhow::Result<Option<String>>;

    /// Receives an asynchronous task associated with the current cycle.
    ///
    /// The default drops the task; variants that need to track cancellation
    /// or completion of spawned work keep it.
    fn register_task(&mut self, task: BoxTask) {
        drop(task);
    }
}

/// Position of a handler within its current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No request has been decoded yet.
    Empty,
    /// A request is held and awaits `handle`.
    RequestSet,
    /// The response (and status, when injected) is ready.
    Handled,
    /// The response has been written to an outbound envelope.
    Marshaled,
}

/// Orchestrates one message cycle for an [`Execute`] variant.
pub struct MessageHandler<E: Execute> {
    marshalling: Marshalling<E::Request, E::Response>,
    executor: E,
    logger: Arc<dyn HandlerLogger>,
    request: Option<E::Request>,
    response: E::Response,
    state: CycleState,
}

impl<E: Execute> MessageHandler<E> {
    /// Binds a variant to its collaborators and logger.
    ///
    /// The held response starts as a freshly made, unpopulated value so that
    /// marshaling before the first `handle` encodes the default response.
    #[must_use]
    pub fn new(
        marshalling: Marshalling<E::Request, E::Response>,
        executor: E,
        logger: Arc<dyn HandlerLogger>,
    ) -> Self {
        let response = (marshalling.make_response)();
        Self {
            marshalling,
            executor,
            logger,
            request: None,
            response,
            state: CycleState::Empty,
        }
    }

    /// Decodes `message` into the held request, starting a new cycle.
    ///
    /// The previous request and response are discarded first, so a failed
    /// decode leaves the handler empty rather than holding stale state.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::NoDecoder`] for outbound-only handlers and
    /// [`HandlerError::Decode`] when the decoder rejects the envelope.
    pub fn set_request(&mut self, message: &StreamingMessage) -> Result<(), HandlerError> {
        self.request = None;
        self.response = (self.marshalling.make_response)();
        self.state = CycleState::Empty;

        let decode = self
            .marshalling
            .decode
            .as_ref()
            .ok_or(HandlerError::NoDecoder)?;
        let request = decode(message).map_err(HandlerError::Decode)?;
        self.request = Some(request);
        self.state = CycleState::RequestSet;
        Ok(())
    }

    /// Runs the variant and wraps the outcome into the response status.
    ///
    /// Execute failures are absorbed: they are logged at error level and, when
    /// a status injector is bound, reported as a failure status.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::StatusInjection`] only when the status injector
    /// itself fails.
    pub fn handle(&mut self) -> Result<(), HandlerError> {
        let mut response = (self.marshalling.make_response)();
        let outcome = self.request.as_ref().map_or_else(
            || Err(anyhow!("no request has been set for this cycle")),
            |request| self.executor.execute(request, &mut response),
        );

        match &outcome {
            Ok(Some(message)) if !message.is_empty() => self.logger.info(message),
            Ok(_) => {}
            Err(error) => self.logger.error(&error.to_string(), error),
        }

        if let Some(inject) = self.marshalling.inject_status.as_ref() {
            inject(&mut response, status_from(outcome)).map_err(HandlerError::StatusInjection)?;
        }

        self.response = response;
        self.state = CycleState::Handled;
        Ok(())
    }

    /// Writes the current response into the outbound envelope.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Encode`] when the encoder fails.
    pub fn marshal_response(
        &mut self,
        builder: &mut StreamingMessageBuilder,
    ) -> Result<(), HandlerError> {
        (self.marshalling.encode)(builder, &self.response).map_err(HandlerError::Encode)?;
        if self.state == CycleState::Handled {
            self.state = CycleState::Marshaled;
        }
        Ok(())
    }

    /// Hands an asynchronous task for the current cycle to the variant.
    pub fn register_task(&mut self, task: BoxTask) {
        self.executor.register_task(task);
    }

    /// Returns where the handler is in its current cycle.
    #[must_use]
    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Returns the request held for the current cycle.
    #[must_use]
    pub const fn request(&self) -> Option<&E::Request> {
        self.request.as_ref()
    }

    /// Returns the response of the current cycle.
    #[must_use]
    pub const fn response(&self) -> &E::Response {
        &self.response
    }

    /// Returns the bound variant.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }
}

/// Converts an execute outcome into the status reported to the host.
fn status_from(outcome: anyhow::Result<Option<String>>) -> StatusResult {
    match outcome {
        Ok(message) => StatusResult::success(message.unwrap_or_default()),
        Err(error) => {
            let message = error.to_string();
            let exception = RpcException::new(message.as_str(), render_stack_trace(&error));
            StatusResult::failure(message, exception)
        }
    }
}

/// Renders the error's cause chain, followed by the backtrace when one was
/// captured.
pub(crate) fn render_stack_trace(error: &anyhow::Error) -> String {
    let chain = error
        .chain()
        .enumerate()
        .map(|(depth, cause)| format!("{depth}: {cause}"))
        .collect::<Vec<_>>()
        .join("\n");

    let backtrace = error.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        format!("{chain}\n\nstack backtrace:\n{backtrace}")
    } else {
        chain
    }
}
