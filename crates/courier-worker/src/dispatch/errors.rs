//! Error types for routing envelopes to handlers.

use courier_protocol::{ContentKind, ProtocolError};
use thiserror::Error;

use crate::handler::HandlerError;

/// Errors surfaced while routing one envelope through its handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the envelope's content kind.
    #[error("no handler registered for {kind}")]
    UnhandledMessage {
        /// Kind carried by the rejected envelope.
        kind: ContentKind,
    },

    /// A handler is already registered for the content kind.
    #[error("a handler is already registered for {kind}")]
    DuplicateHandler {
        /// Kind that was registered twice.
        kind: ContentKind,
    },

    /// The handler cycle failed outside of business logic.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// The outbound envelope could not be assembled.
    #[error("failed to build response envelope: {0}")]
    Protocol(#[from] ProtocolError),
}

impl DispatchError {
    /// Creates an unhandled message error.
    #[must_use]
    pub const fn unhandled(kind: ContentKind) -> Self {
        Self::UnhandledMessage { kind }
    }

    /// Creates a duplicate handler error.
    #[must_use]
    pub const fn duplicate(kind: ContentKind) -> Self {
        Self::DuplicateHandler { kind }
    }
}
