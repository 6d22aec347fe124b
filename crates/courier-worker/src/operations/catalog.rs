//! Registry of functions the host has loaded into the worker.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use courier_protocol::FunctionMetadata;
use thiserror::Error;

/// Errors raised by [`FunctionCatalog`] operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A different definition is already loaded under the same id.
    #[error("function '{function_id}' is already loaded with a different definition")]
    Conflict {
        /// Id of the conflicting function.
        function_id: String,
    },

    /// A required metadata field was empty.
    #[error("function metadata field '{field}' must not be empty")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// The catalogue lock was poisoned by a panicking writer.
    #[error("function catalog lock poisoned")]
    Poisoned,
}

/// Whether a load added a new function or repeated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The function was not known before.
    Loaded,
    /// The identical definition was already present.
    AlreadyLoaded,
}

/// Shared, cloneable map of function id to metadata.
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    functions: Arc<Mutex<BTreeMap<String, FunctionMetadata>>>,
}

impl FunctionCatalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `metadata` under `function_id`.
    ///
    /// Loading the same definition twice is accepted and reported as
    /// [`LoadOutcome::AlreadyLoaded`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingField`] for empty ids, names, script
    /// files or entry points, and [`CatalogError::Conflict`] when the id is
    /// already bound to a different definition.
    pub fn load(
        &self,
        function_id: &str,
        metadata: &FunctionMetadata,
    ) -> Result<LoadOutcome, CatalogError> {
        validate(function_id, metadata)?;

        let mut functions = self.lock()?;
        match functions.get(function_id) {
            Some(existing) if existing == metadata => Ok(LoadOutcome::AlreadyLoaded),
            Some(_) => Err(CatalogError::Conflict {
                function_id: function_id.to_owned(),
            }),
            None => {
                functions.insert(function_id.to_owned(), metadata.clone());
                Ok(LoadOutcome::Loaded)
            }
        }
    }

    /// Returns the metadata for `function_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Poisoned`] if the lock is poisoned.
    pub fn get(&self, function_id: &str) -> Result<Option<FunctionMetadata>, CatalogError> {
        Ok(self.lock()?.get(function_id).cloned())
    }

    /// Returns the number of loaded functions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Poisoned`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` when no function is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Poisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, FunctionMetadata>>, CatalogError> {
        self.functions.lock().map_err(|_| CatalogError::Poisoned)
    }
}

fn validate(function_id: &str, metadata: &FunctionMetadata) -> Result<(), CatalogError> {
    let fields = [
        ("function_id", function_id),
        ("name", metadata.name.as_str()),
        ("script_file", metadata.script_file.as_str()),
        ("entry_point", metadata.entry_point.as_str()),
    ];
    fields
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map_or(Ok(()), |(field, _)| Err(CatalogError::MissingField { field }))
}
