//! The envelope exchanged between host and worker.
//!
//! Inbound envelopes are parsed from one JSONL line each and are immutable.
//! Outbound envelopes are assembled through a [`StreamingMessageBuilder`] so
//! handlers can contribute their content fragment before the transport sends
//! the finished message.

use serde::{Deserialize, Serialize};

use crate::content::{Content, Payload};
use crate::error::ProtocolError;

/// A protocol envelope: request id plus one typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingMessage {
    request_id: String,
    content: Content,
}

impl StreamingMessage {
    /// Creates an envelope directly from its parts.
    #[must_use]
    pub fn new(request_id: impl Into<String>, content: Content) -> Self {
        Self {
            request_id: request_id.into(),
            content,
        }
    }

    /// Starts an outbound envelope for the given request id.
    #[must_use]
    pub fn builder(request_id: impl Into<String>) -> StreamingMessageBuilder {
        StreamingMessageBuilder::new(request_id)
    }

    /// Parses a JSONL line into an envelope.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed before
    /// parsing.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedJsonl`] if the line is empty or does
    /// not match the envelope schema.
    pub fn parse(line: &[u8]) -> Result<Self, ProtocolError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(ProtocolError::malformed("empty message line"));
        }

        serde_json::from_slice(trimmed).map_err(ProtocolError::from_json_error)
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> &str {
        self.request_id.as_str()
    }

    /// Returns the payload.
    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// Borrows the payload as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnexpectedContent`] when the envelope carries
    /// a different payload kind.
    pub fn payload<T: Payload>(&self) -> Result<&T, ProtocolError> {
        T::from_content(&self.content)
            .ok_or_else(|| ProtocolError::unexpected_content(T::KIND, self.content.kind()))
    }
}

/// Mutable outbound envelope under construction.
///
/// The content slot behaves like a protobuf oneof: writing a new fragment
/// replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingMessageBuilder {
    request_id: String,
    content: Option<Content>,
}

impl StreamingMessageBuilder {
    /// Creates an empty builder for the given request id.
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            content: None,
        }
    }

    /// Sets the content fragment.
    pub fn set_content(&mut self, content: Content) -> &mut Self {
        self.content = Some(content);
        self
    }

    /// Sets the content fragment from a typed payload.
    pub fn set_payload<T: Payload>(&mut self, payload: T) -> &mut Self {
        self.set_content(payload.into_content())
    }

    /// Returns the content written so far.
    #[must_use]
    pub const fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Returns the request id the envelope will carry.
    #[must_use]
    pub const fn request_id(&self) -> &str {
        self.request_id.as_str()
    }

    /// Finishes the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingContent`] if no content was set.
    pub fn build(self) -> Result<StreamingMessage, ProtocolError> {
        let Some(content) = self.content else {
            return Err(ProtocolError::missing_content(self.request_id));
        };
        Ok(StreamingMessage {
            request_id: self.request_id,
            content,
        })
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}
