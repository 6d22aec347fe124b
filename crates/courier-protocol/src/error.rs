//! Errors raised while decoding, encoding, or framing protocol messages.

use std::io;

use thiserror::Error;

use crate::content::ContentKind;

/// Errors surfaced by the protocol layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A JSONL line could not be parsed into an envelope.
    #[error("malformed JSONL: {message}")]
    MalformedJsonl {
        /// Human-readable parse failure.
        message: String,
        /// Underlying JSON error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The envelope carried a different payload than the decoder expects.
    #[error("expected {expected} content but received {actual}")]
    UnexpectedContent {
        /// Payload kind the decoder handles.
        expected: ContentKind,
        /// Payload kind actually present.
        actual: ContentKind,
    },

    /// An outbound envelope was built without any content.
    #[error("outbound message '{request_id}' has no content")]
    MissingContent {
        /// Request id of the incomplete envelope.
        request_id: String,
    },

    /// A status envelope violated the success/exception invariant.
    #[error("invalid status result: {message}")]
    InvalidStatus {
        /// Description of the violation.
        message: String,
    },

    /// I/O error while reading or writing frames.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialising an outbound envelope failed.
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Creates a malformed JSONL error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedJsonl {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed JSONL error with a custom message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJsonl {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unexpected content error.
    #[must_use]
    pub const fn unexpected_content(expected: ContentKind, actual: ContentKind) -> Self {
        Self::UnexpectedContent { expected, actual }
    }

    /// Creates a missing content error.
    #[must_use]
    pub fn missing_content(request_id: impl Into<String>) -> Self {
        Self::MissingContent {
            request_id: request_id.into(),
        }
    }

    /// Creates an invalid status error.
    #[must_use]
    pub fn invalid_status(message: impl Into<String>) -> Self {
        Self::InvalidStatus {
            message: message.into(),
        }
    }
}
