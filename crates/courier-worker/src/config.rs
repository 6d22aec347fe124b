//! Runtime configuration for the worker process.
//!
//! [`WorkerConfig`] is loaded through `ortho_config`, layering defaults,
//! configuration files, `COURIER_*` environment variables and command-line
//! flags. Values the loader accepts are then validated so a misconfigured
//! worker fails before it opens the stream.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Default worker id.
pub const DEFAULT_WORKER_ID: &str = "courier-worker";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Returns the default log filter expression.
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Returns the default log output format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Returns the default worker id.
#[must_use]
pub fn default_worker_id() -> String {
    DEFAULT_WORKER_ID.to_owned()
}

/// Errors raised while loading [`WorkerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layered loader rejected a source, including unknown log formats.
    #[error("failed to load configuration: {source}")]
    Load {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },

    /// A setting resolved to an empty or whitespace-only value.
    #[error("{field} must not be empty")]
    EmptyValue {
        /// Setting that was empty.
        field: &'static str,
    },
}

/// Worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURIER")]
pub struct WorkerConfig {
    /// Tracing filter expression.
    #[ortho_config(default = default_log_filter())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Id announced in `start_stream`.
    #[ortho_config(default = default_worker_id())]
    pub worker_id: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_format: default_log_format(),
            worker_id: default_worker_id(),
        }
    }
}

impl WorkerConfig {
    /// Loads the configuration for the running process and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source cannot be merged and
    /// [`ConfigError::EmptyValue`] when a setting is blank.
    pub fn load_validated() -> Result<Self, ConfigError> {
        Self::load()
            .map_err(|source| ConfigError::Load { source })?
            .validated()
    }

    /// Loads the configuration using `args` as the command line.
    ///
    /// The first argument is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// See [`WorkerConfig::load_validated`].
    pub fn load_validated_from(
        args: impl IntoIterator<Item = OsString>,
    ) -> Result<Self, ConfigError> {
        Self::load_from_iter(args)
            .map_err(|source| ConfigError::Load { source })?
            .validated()
    }

    /// Trims surrounding whitespace and rejects blank settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyValue`] naming the first blank setting.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.log_filter = required("log_filter", &self.log_filter)?;
        self.worker_id = required("worker_id", &self.worker_id)?;
        Ok(self)
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the id announced when the stream opens.
    #[must_use]
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue { field });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_pass_validation() {
        let config = WorkerConfig::default().validated().expect("valid");

        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.worker_id(), "courier-worker");
    }

    #[rstest]
    fn validation_trims_surrounding_whitespace() {
        let config = WorkerConfig {
            worker_id: String::from(" worker-3 "),
            ..WorkerConfig::default()
        }
        .validated()
        .expect("valid");

        assert_eq!(config.worker_id(), "worker-3");
    }

    #[rstest]
    #[case::filter(
        WorkerConfig { log_filter: String::from("   "), ..WorkerConfig::default() },
        "log_filter"
    )]
    #[case::worker_id(
        WorkerConfig { worker_id: String::new(), ..WorkerConfig::default() },
        "worker_id"
    )]
    fn blank_values_are_rejected(#[case] config: WorkerConfig, #[case] field: &'static str) {
        let error = config.validated().expect_err("blank value");

        assert!(matches!(error, ConfigError::EmptyValue { field: found } if found == field));
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("COMPACT", LogFormat::Compact)]
    fn log_format_parses_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>().expect("parse"), expected);
    }
}
