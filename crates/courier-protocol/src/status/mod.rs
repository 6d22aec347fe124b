//! Uniform status envelope attached to request-driven responses.
//!
//! A [`StatusResult`] is either a success with an informational message or a
//! failure carrying an [`RpcException`]. The exception is present if and only
//! if the status is [`Status::Failure`]; the constructors and the serde
//! representation both uphold that rule.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Outcome reported to the host for one handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The worker-side logic completed normally.
    Success,
    /// The worker-side logic failed; see the attached exception.
    Failure,
}

/// Error detail reported alongside a failure status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcException {
    message: String,
    stack_trace: String,
}

impl RpcException {
    /// Creates an exception detail from a message and a rendered stack trace.
    #[must_use]
    pub fn new(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the textual stack trace.
    #[must_use]
    pub const fn stack_trace(&self) -> &str {
        self.stack_trace.as_str()
    }
}

/// Success or failure envelope injected into response payloads.
///
/// # Example
///
/// ```
/// use courier_protocol::{RpcException, Status, StatusResult};
///
/// let ok = StatusResult::success("pong sent");
/// assert_eq!(ok.status(), Status::Success);
/// assert!(ok.exception().is_none());
///
/// let failed = StatusResult::failure("disk full", RpcException::new("disk full", "0: disk full"));
/// assert_eq!(failed.status(), Status::Failure);
/// assert_eq!(failed.exception().map(RpcException::message), Some("disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStatusResult")]
pub struct StatusResult {
    status: Status,
    result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<RpcException>,
}

impl StatusResult {
    /// Creates a success status with the given informational message.
    #[must_use]
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            result: result.into(),
            exception: None,
        }
    }

    /// Creates a failure status carrying the exception detail.
    #[must_use]
    pub fn failure(result: impl Into<String>, exception: RpcException) -> Self {
        Self {
            status: Status::Failure,
            result: result.into(),
            exception: Some(exception),
        }
    }

    /// Returns the reported status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns `true` when the status is [`Status::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, Status::Success)
    }

    /// Returns the status message (empty when none was produced).
    #[must_use]
    pub const fn result(&self) -> &str {
        self.result.as_str()
    }

    /// Returns the exception detail, present only on failure.
    #[must_use]
    pub const fn exception(&self) -> Option<&RpcException> {
        self.exception.as_ref()
    }
}

/// Unchecked wire shape, validated into [`StatusResult`].
#[derive(Deserialize)]
struct RawStatusResult {
    status: Status,
    #[serde(default)]
    result: String,
    #[serde(default)]
    exception: Option<RpcException>,
}

impl TryFrom<RawStatusResult> for StatusResult {
    type Error = ProtocolError;

    fn try_from(raw: RawStatusResult) -> Result<Self, Self::Error> {
        match (raw.status, raw.exception) {
            (Status::Success, None) => Ok(Self::success(raw.result)),
            (Status::Failure, Some(exception)) => Ok(Self::failure(raw.result, exception)),
            (Status::Success, Some(_)) => Err(ProtocolError::invalid_status(
                "success status must not carry an exception",
            )),
            (Status::Failure, None) => Err(ProtocolError::invalid_status(
                "failure status requires an exception",
            )),
        }
    }
}
