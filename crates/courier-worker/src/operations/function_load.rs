//! Function loading into the shared catalogue.

use courier_protocol::{FunctionLoadRequest, FunctionLoadResponse};

use super::catalog::{FunctionCatalog, LoadOutcome};
use crate::handler::Execute;

/// Records function definitions sent by the host.
#[derive(Debug, Clone, Default)]
pub struct FunctionLoadHandler {
    catalog: FunctionCatalog,
}

impl FunctionLoadHandler {
    /// Creates the variant writing into `catalog`.
    #[must_use]
    pub const fn new(catalog: FunctionCatalog) -> Self {
        Self { catalog }
    }

    /// Returns the catalogue loads are written to.
    #[must_use]
    pub const fn catalog(&self) -> &FunctionCatalog {
        &self.catalog
    }
}

impl Execute for FunctionLoadHandler {
    type Request = FunctionLoadRequest;
    type Response = FunctionLoadResponse;

    fn execute(
        &mut self,
        request: &FunctionLoadRequest,
        response: &mut FunctionLoadResponse,
    ) -> anyhow::Result<Option<String>> {
        response.function_id.clone_from(&request.function_id);

        let outcome = self.catalog.load(&request.function_id, &request.metadata)?;
        let name = &request.metadata.name;
        let id = &request.function_id;
        Ok(Some(match outcome {
            LoadOutcome::Loaded => format!("function \"{name}\" loaded as {id}"),
            LoadOutcome::AlreadyLoaded => format!("function \"{name}\" already loaded as {id}"),
        }))
    }
}
