//! Built-in handler variants for the host-initiated message kinds.
//!
//! Each variant implements [`Execute`] for one request/response payload pair
//! and is bound to the protocol with [`payload_handler`].

pub mod catalog;
mod environment_reload;
mod function_load;
mod worker_init;
mod worker_status;

use std::sync::Arc;

use courier_protocol::{Payload, StatusCarrier};

use crate::handler::{Execute, HandlerLogger, Marshalling, MessageHandler};

pub use self::catalog::{CatalogError, FunctionCatalog, LoadOutcome};
pub use self::environment_reload::{EnvironmentReloadHandler, ReloadedEnvironment};
pub use self::function_load::FunctionLoadHandler;
pub use self::worker_init::{
    CAPABILITY_ENVIRONMENT_RELOAD, CAPABILITY_STATUS_ENVELOPE, WorkerInitHandler,
};
pub use self::worker_status::WorkerStatusHandler;

/// Binds `executor` to the payload-derived collaborators of its request and
/// response types.
#[must_use]
pub fn payload_handler<E>(executor: E, logger: Arc<dyn HandlerLogger>) -> MessageHandler<E>
where
    E: Execute,
    E::Request: Payload + 'static,
    E::Response: Payload + StatusCarrier + Default + 'static,
{
    MessageHandler::new(Marshalling::for_payloads(), executor, logger)
}

#[cfg(test)]
mod tests;
