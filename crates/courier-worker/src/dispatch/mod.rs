//! Routing of inbound envelopes to handler instances.
//!
//! The [`Dispatcher`] owns one handler per request [`ContentKind`]. For every
//! inbound envelope it runs the full `set_request` → `handle` →
//! `marshal_response` cycle on the matching handler and assembles the reply
//! under the same request id.

mod errors;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use courier_protocol::{ContentKind, StreamingMessage, StreamingMessageBuilder};
use tracing::debug;

use crate::handler::{Execute, HandlerError, HandlerLogger, MessageHandler};
use crate::operations::{
    EnvironmentReloadHandler, FunctionCatalog, FunctionLoadHandler, WorkerInitHandler,
    WorkerStatusHandler, payload_handler,
};

pub use self::errors::DispatchError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// A handler driven through one complete cycle per envelope.
///
/// Implemented for every [`MessageHandler`] so handlers with different
/// request and response types can share one routing table.
pub trait CycleHandler {
    /// Decodes `message`, runs the business logic and writes the response
    /// into `builder`.
    ///
    /// # Errors
    ///
    /// Returns the first framework error raised by the cycle.
    fn process(
        &mut self,
        message: &StreamingMessage,
        builder: &mut StreamingMessageBuilder,
    ) -> Result<(), HandlerError>;
}

impl<E: Execute> CycleHandler for MessageHandler<E> {
    fn process(
        &mut self,
        message: &StreamingMessage,
        builder: &mut StreamingMessageBuilder,
    ) -> Result<(), HandlerError> {
        self.set_request(message)?;
        self.handle()?;
        self.marshal_response(builder)
    }
}

/// Routes envelopes to the handler registered for their content kind.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<ContentKind, Box<dyn CycleHandler>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher serving the built-in request kinds.
    ///
    /// Function loads are recorded in `catalog`; every handler reports
    /// through `logger`.
    #[must_use]
    pub fn with_default_handlers(
        catalog: FunctionCatalog,
        logger: Arc<dyn HandlerLogger>,
    ) -> Self {
        let mut handlers: HashMap<ContentKind, Box<dyn CycleHandler>> = HashMap::new();
        handlers.insert(
            ContentKind::WorkerInitRequest,
            Box::new(payload_handler(WorkerInitHandler::default(), logger.clone())),
        );
        handlers.insert(
            ContentKind::FunctionLoadRequest,
            Box::new(payload_handler(
                FunctionLoadHandler::new(catalog),
                logger.clone(),
            )),
        );
        handlers.insert(
            ContentKind::WorkerStatusRequest,
            Box::new(payload_handler(WorkerStatusHandler, logger.clone())),
        );
        handlers.insert(
            ContentKind::FunctionEnvironmentReloadRequest,
            Box::new(payload_handler(EnvironmentReloadHandler::default(), logger)),
        );
        Self { handlers }
    }

    /// Registers `handler` for envelopes carrying `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateHandler`] if `kind` already has a
    /// handler; the existing registration is kept.
    pub fn register(
        &mut self,
        kind: ContentKind,
        handler: impl CycleHandler + 'static,
    ) -> Result<(), DispatchError> {
        if self.handlers.contains_key(&kind) {
            return Err(DispatchError::duplicate(kind));
        }
        self.handlers.insert(kind, Box::new(handler));
        Ok(())
    }

    /// Returns `true` when a handler is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: ContentKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Runs one cycle for `message` and returns the reply envelope.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnhandledMessage`] for unknown kinds,
    /// [`DispatchError::Handler`] when the cycle fails and
    /// [`DispatchError::Protocol`] when the handler wrote no content.
    pub fn dispatch(
        &mut self,
        message: &StreamingMessage,
    ) -> Result<StreamingMessage, DispatchError> {
        let kind = message.content().kind();
        let handler = self
            .handlers
            .get_mut(&kind)
            .ok_or_else(|| DispatchError::unhandled(kind))?;

        debug!(
            target: DISPATCH_TARGET,
            request_id = message.request_id(),
            kind = %kind,
            "dispatching message"
        );

        let mut builder = StreamingMessage::builder(message.request_id());
        handler.process(message, &mut builder)?;
        Ok(builder.build()?)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<ContentKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        f.debug_struct("Dispatcher").field("kinds", &kinds).finish()
    }
}
