//! Function application environment reload.

use std::collections::BTreeMap;

use anyhow::ensure;
use courier_protocol::{FunctionEnvironmentReloadRequest, FunctionEnvironmentReloadResponse};

use crate::handler::Execute;

/// Environment applied by the most recent successful reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadedEnvironment {
    /// Directory holding the function application.
    pub directory: String,
    /// Environment variables supplied by the host.
    pub variables: BTreeMap<String, String>,
}

/// Switches the worker to a new function application environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentReloadHandler {
    current: Option<ReloadedEnvironment>,
}

impl EnvironmentReloadHandler {
    /// Returns the environment applied by the last successful reload.
    #[must_use]
    pub const fn current(&self) -> Option<&ReloadedEnvironment> {
        self.current.as_ref()
    }
}

impl Execute for EnvironmentReloadHandler {
    type Request = FunctionEnvironmentReloadRequest;
    type Response = FunctionEnvironmentReloadResponse;

    fn execute(
        &mut self,
        request: &FunctionEnvironmentReloadRequest,
        _response: &mut FunctionEnvironmentReloadResponse,
    ) -> anyhow::Result<Option<String>> {
        let directory = request.function_app_directory.trim();
        ensure!(
            !directory.is_empty(),
            "function app directory must not be empty"
        );
        ensure!(
            !request.environment_variables.keys().any(|key| key.is_empty()),
            "environment variable names must not be empty"
        );

        self.current = Some(ReloadedEnvironment {
            directory: directory.to_owned(),
            variables: request.environment_variables.clone(),
        });
        Ok(Some(format!(
            "environment reloaded from {directory} with {} variables",
            request.environment_variables.len()
        )))
    }
}
