//! Logging capability injected into message handlers.

use tracing::{error, info};

/// Tracing target for handler events.
pub(crate) const HANDLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handler");

/// Sink for the two events a handler cycle reports.
#[cfg_attr(test, mockall::automock)]
pub trait HandlerLogger: Send + Sync {
    /// Records the informational message returned by a successful execute.
    fn info(&self, message: &str);

    /// Records a failed execute together with the original error.
    fn error(&self, message: &str, error: &anyhow::Error);
}

/// Logger that forwards handler events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl HandlerLogger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: HANDLER_TARGET, "{message}");
    }

    fn error(&self, message: &str, error: &anyhow::Error) {
        error!(target: HANDLER_TARGET, error = ?error, "{message}");
    }
}
