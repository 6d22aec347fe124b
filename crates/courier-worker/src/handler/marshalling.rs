//! Collaborator functions binding a handler to concrete message types.

use std::fmt;

use courier_protocol::{
    Payload, ProtocolError, StatusCarrier, StatusResult, StreamingMessage,
    StreamingMessageBuilder,
};

type DecodeFn<Req> = Box<dyn Fn(&StreamingMessage) -> Result<Req, ProtocolError> + Send + Sync>;
type MakeResponseFn<Resp> = Box<dyn Fn() -> Resp + Send + Sync>;
type InjectStatusFn<Resp> =
    Box<dyn Fn(&mut Resp, StatusResult) -> Result<(), ProtocolError> + Send + Sync>;
type EncodeFn<Resp> =
    Box<dyn Fn(&mut StreamingMessageBuilder, &Resp) -> Result<(), ProtocolError> + Send + Sync>;

/// The four collaborators a [`MessageHandler`](super::MessageHandler) is
/// bound to.
///
/// The functions are immutable strategies shared by every cycle of one
/// handler instance. A missing status injector disables status wrapping
/// entirely; a missing decoder marks an outbound-only handler.
pub struct Marshalling<Req, Resp> {
    pub(super) decode: Option<DecodeFn<Req>>,
    pub(super) make_response: MakeResponseFn<Resp>,
    pub(super) inject_status: Option<InjectStatusFn<Resp>>,
    pub(super) encode: EncodeFn<Resp>,
}

impl<Req, Resp> Marshalling<Req, Resp> {
    /// Collaborators for a request-driven handler.
    #[must_use]
    pub fn request_driven(
        decode: impl Fn(&StreamingMessage) -> Result<Req, ProtocolError> + Send + Sync + 'static,
        make_response: impl Fn() -> Resp + Send + Sync + 'static,
        inject_status: impl Fn(&mut Resp, StatusResult) -> Result<(), ProtocolError>
        + Send
        + Sync
        + 'static,
        encode: impl Fn(&mut StreamingMessageBuilder, &Resp) -> Result<(), ProtocolError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            decode: Some(Box::new(decode)),
            make_response: Box::new(make_response),
            inject_status: Some(Box::new(inject_status)),
            encode: Box::new(encode),
        }
    }

    /// Collaborators for an outbound-only handler: no decoder, no status.
    #[must_use]
    pub fn outbound(
        make_response: impl Fn() -> Resp + Send + Sync + 'static,
        encode: impl Fn(&mut StreamingMessageBuilder, &Resp) -> Result<(), ProtocolError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            decode: None,
            make_response: Box::new(make_response),
            inject_status: None,
            encode: Box::new(encode),
        }
    }

    /// Drops the status injector so responses carry no status envelope.
    #[must_use]
    pub fn without_status(mut self) -> Self {
        self.inject_status = None;
        self
    }

    /// Returns `true` when a request decoder is bound.
    #[must_use]
    pub const fn decodes_requests(&self) -> bool {
        self.decode.is_some()
    }

    /// Returns `true` when a status injector is bound.
    #[must_use]
    pub const fn injects_status(&self) -> bool {
        self.inject_status.is_some()
    }
}

impl<Req, Resp> Marshalling<Req, Resp>
where
    Req: Payload + 'static,
    Resp: Payload + StatusCarrier + Default + 'static,
{
    /// Collaborators derived from the protocol payload traits.
    ///
    /// Decoding borrows the matching [`Content`](courier_protocol::Content)
    /// variant, responses start from `Default`, the status lands in the
    /// response's `result` field, and encoding writes the response variant.
    #[must_use]
    pub fn for_payloads() -> Self {
        Self::request_driven(
            decode_payload::<Req>,
            Resp::default,
            inject_payload_status::<Resp>,
            encode_payload::<Resp>,
        )
    }
}

impl<Req, Resp> fmt::Debug for Marshalling<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshalling")
            .field("decodes_requests", &self.decodes_requests())
            .field("injects_status", &self.injects_status())
            .finish_non_exhaustive()
    }
}

/// Decodes the payload of type `T` from an inbound envelope.
///
/// # Errors
///
/// Returns [`ProtocolError::UnexpectedContent`] when the envelope carries a
/// different payload kind.
pub fn decode_payload<T: Payload>(message: &StreamingMessage) -> Result<T, ProtocolError> {
    message.payload::<T>().cloned()
}

/// Writes `response` into the outbound envelope as its content variant.
///
/// # Errors
///
/// Never fails; the signature matches the encoder contract.
pub fn encode_payload<T: Payload>(
    builder: &mut StreamingMessageBuilder,
    response: &T,
) -> Result<(), ProtocolError> {
    builder.set_payload(response.clone());
    Ok(())
}

fn inject_payload_status<T: StatusCarrier>(
    response: &mut T,
    status: StatusResult,
) -> Result<(), ProtocolError> {
    response.set_result(status);
    Ok(())
}
