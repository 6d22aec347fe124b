//! Outbound-only variant for worker-initiated messages.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use courier_protocol::{ProtocolError, StreamingMessageBuilder};

use super::{Execute, HandlerError, HandlerLogger, Marshalling, MessageHandler};

/// Variant producing a response of type `R` with no inbound request.
///
/// Its execute step does no work and reports which response type it
/// generated, purely for diagnostic logging.
pub struct Generator<R> {
    _response: PhantomData<fn() -> R>,
}

impl<R> Generator<R> {
    /// Creates the generator variant.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _response: PhantomData,
        }
    }
}

impl<R> Default for Generator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Generator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Generator").field(&short_type_name::<R>()).finish()
    }
}

impl<R> Execute for Generator<R> {
    type Request = ();
    type Response = R;

    fn execute(&mut self, _request: &(), _response: &mut R) -> anyhow::Result<Option<String>> {
        Ok(Some(generated_message::<R>()))
    }
}

impl<R> MessageHandler<Generator<R>> {
    /// Builds an outbound-only handler and runs its single cycle.
    ///
    /// The returned handler is already in
    /// [`CycleState::Handled`](super::CycleState::Handled); call
    /// [`MessageHandler::marshal_response`] to emit the message.
    ///
    /// # Errors
    ///
    /// No status injector is bound, so the cycle cannot fail in practice; the
    /// result mirrors [`MessageHandler::handle`].
    pub fn generate(
        make_response: impl Fn() -> R + Send + Sync + 'static,
        encode: impl Fn(&mut StreamingMessageBuilder, &R) -> Result<(), ProtocolError>
        + Send
        + Sync
        + 'static,
        logger: Arc<dyn HandlerLogger>,
    ) -> Result<Self, HandlerError> {
        let marshalling = Marshalling::outbound(make_response, encode);
        let mut handler = Self::new(marshalling, Generator::new(), logger);
        handler.request = Some(());
        handler.handle()?;
        Ok(handler)
    }
}

/// Diagnostic message reported by a generator for response type `R`.
#[must_use]
pub fn generated_message<R>() -> String {
    format!("Message generated by \"{}\"", short_type_name::<R>())
}

/// Returns the unqualified name of `T`, without module path or generics.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
