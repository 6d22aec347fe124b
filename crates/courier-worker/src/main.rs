//! Courier worker entry point.
//!
//! Speaks the JSONL protocol on stdin/stdout; diagnostics go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use courier_worker::operations::FunctionCatalog;
use courier_worker::{
    Dispatcher, HandlerLogger, TracingLogger, WorkerConfig, run_session, telemetry,
};
use tracing::{error, info};

const MAIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::main");

fn main() -> ExitCode {
    let (config, config_error) = match WorkerConfig::load_validated() {
        Ok(config) => (config, None),
        Err(error) => (WorkerConfig::default(), Some(error)),
    };

    if let Err(error) = telemetry::initialise(&config) {
        drop(writeln!(io::stderr(), "courier-worker: {error}"));
        return ExitCode::FAILURE;
    }
    if let Some(error) = config_error {
        error!(target: MAIN_TARGET, %error, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let logger: Arc<dyn HandlerLogger> = Arc::new(TracingLogger);
    let mut dispatcher =
        Dispatcher::with_default_handlers(FunctionCatalog::new(), Arc::clone(&logger));
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    match run_session(
        &mut stdin,
        &mut stdout,
        &mut dispatcher,
        config.worker_id(),
        &logger,
    ) {
        Ok(summary) => {
            info!(
                target: MAIN_TARGET,
                handled = summary.handled,
                rejected = summary.rejected,
                "session finished"
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!(target: MAIN_TARGET, %error, "session aborted");
            ExitCode::FAILURE
        }
    }
}
