//! Host handshake.

use std::collections::BTreeMap;

use anyhow::ensure;
use courier_protocol::{WorkerInitRequest, WorkerInitResponse};

use crate::handler::Execute;

/// Capability advertising that responses carry a status envelope.
pub const CAPABILITY_STATUS_ENVELOPE: &str = "status_envelope";

/// Capability advertising that the worker reloads environments in place.
pub const CAPABILITY_ENVIRONMENT_RELOAD: &str = "environment_reload";

/// Answers the host handshake with the worker version and capabilities.
#[derive(Debug, Clone)]
pub struct WorkerInitHandler {
    worker_version: String,
    capabilities: BTreeMap<String, String>,
}

impl WorkerInitHandler {
    /// Creates the handshake variant for the given worker version.
    #[must_use]
    pub fn new(worker_version: impl Into<String>) -> Self {
        let capabilities = [CAPABILITY_STATUS_ENVELOPE, CAPABILITY_ENVIRONMENT_RELOAD]
            .into_iter()
            .map(|name| (name.to_owned(), String::from("true")))
            .collect();
        Self {
            worker_version: worker_version.into(),
            capabilities,
        }
    }

    /// Returns the advertised capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> &BTreeMap<String, String> {
        &self.capabilities
    }
}

impl Default for WorkerInitHandler {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl Execute for WorkerInitHandler {
    type Request = WorkerInitRequest;
    type Response = WorkerInitResponse;

    fn execute(
        &mut self,
        request: &WorkerInitRequest,
        response: &mut WorkerInitResponse,
    ) -> anyhow::Result<Option<String>> {
        ensure!(
            !request.host_version.trim().is_empty(),
            "host version must not be empty"
        );

        response.worker_version.clone_from(&self.worker_version);
        response.capabilities.clone_from(&self.capabilities);
        Ok(Some(format!(
            "worker {} initialised for host {}",
            self.worker_version, request.host_version
        )))
    }
}
