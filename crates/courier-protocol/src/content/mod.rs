//! Typed payloads carried by [`StreamingMessage`](crate::StreamingMessage).
//!
//! [`Content`] is a tagged union: the `kind` field names the payload and the
//! remaining fields belong to it. Host-initiated requests pair with a response
//! payload that exposes a [`StatusResult`] through [`StatusCarrier`].
//! Worker-initiated payloads ([`StartStream`], [`RpcLog`]) have no status.
//!
//! ```json
//! {"request_id":"7","content":{"kind":"worker_status_request"}}
//! {"request_id":"7","content":{"kind":"worker_status_response","result":{"status":"success","result":""}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::status::StatusResult;

/// Payload kinds understood by the worker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    /// Host handshake request.
    WorkerInitRequest,
    /// Worker handshake response.
    WorkerInitResponse,
    /// Request to load a function definition.
    FunctionLoadRequest,
    /// Result of a function load.
    FunctionLoadResponse,
    /// Host health ping.
    WorkerStatusRequest,
    /// Worker health reply.
    WorkerStatusResponse,
    /// Request to reload the function environment.
    FunctionEnvironmentReloadRequest,
    /// Result of an environment reload.
    FunctionEnvironmentReloadResponse,
    /// Worker-initiated stream opener.
    StartStream,
    /// Worker-initiated log record.
    RpcLog,
}

/// The payload of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    /// Host handshake request.
    WorkerInitRequest(WorkerInitRequest),
    /// Worker handshake response.
    WorkerInitResponse(WorkerInitResponse),
    /// Request to load a function definition.
    FunctionLoadRequest(FunctionLoadRequest),
    /// Result of a function load.
    FunctionLoadResponse(FunctionLoadResponse),
    /// Host health ping.
    WorkerStatusRequest(WorkerStatusRequest),
    /// Worker health reply.
    WorkerStatusResponse(WorkerStatusResponse),
    /// Request to reload the function environment.
    FunctionEnvironmentReloadRequest(FunctionEnvironmentReloadRequest),
    /// Result of an environment reload.
    FunctionEnvironmentReloadResponse(FunctionEnvironmentReloadResponse),
    /// Worker-initiated stream opener.
    StartStream(StartStream),
    /// Worker-initiated log record.
    RpcLog(RpcLog),
}

/// A payload type that maps one-to-one onto a [`Content`] variant.
pub trait Payload: Clone {
    /// The content kind this payload is carried as.
    const KIND: ContentKind;

    /// Borrows the payload out of `content` when the variant matches.
    fn from_content(content: &Content) -> Option<&Self>;

    /// Wraps the payload into its [`Content`] variant.
    fn into_content(self) -> Content;
}

/// A response payload that reports a [`StatusResult`] to the host.
pub trait StatusCarrier {
    /// Attaches the status envelope, replacing any previous one.
    fn set_result(&mut self, result: StatusResult);

    /// Returns the attached status envelope, if any.
    fn result(&self) -> Option<&StatusResult>;
}

macro_rules! payload {
    ($($name:ident),+ $(,)?) => {
        impl Content {
            /// Returns the kind of the carried payload.
            #[must_use]
            pub const fn kind(&self) -> ContentKind {
                match self {
                    $(Self::$name(_) => ContentKind::$name,)+
                }
            }
        }

        $(
            impl Payload for $name {
                const KIND: ContentKind = ContentKind::$name;

                fn from_content(content: &Content) -> Option<&Self> {
                    match content {
                        Content::$name(payload) => Some(payload),
                        _ => None,
                    }
                }

                fn into_content(self) -> Content {
                    Content::$name(self)
                }
            }
        )+
    };
}

macro_rules! status_carrier {
    ($($name:ident),+ $(,)?) => {
        $(
            impl StatusCarrier for $name {
                fn set_result(&mut self, result: StatusResult) {
                    self.result = Some(result);
                }

                fn result(&self) -> Option<&StatusResult> {
                    self.result.as_ref()
                }
            }
        )+
    };
}

payload!(
    WorkerInitRequest,
    WorkerInitResponse,
    FunctionLoadRequest,
    FunctionLoadResponse,
    WorkerStatusRequest,
    WorkerStatusResponse,
    FunctionEnvironmentReloadRequest,
    FunctionEnvironmentReloadResponse,
    StartStream,
    RpcLog,
);

status_carrier!(
    WorkerInitResponse,
    FunctionLoadResponse,
    WorkerStatusResponse,
    FunctionEnvironmentReloadResponse,
);

/// Handshake sent by the host when the stream opens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInitRequest {
    /// Version string of the host runtime.
    pub host_version: String,
    /// Capabilities advertised by the host.
    #[serde(default)]
    pub capabilities: BTreeMap<String, String>,
}

/// Worker reply to [`WorkerInitRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInitResponse {
    /// Status of the handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatusResult>,
    /// Version string of the worker.
    #[serde(default)]
    pub worker_version: String,
    /// Capabilities advertised by the worker.
    #[serde(default)]
    pub capabilities: BTreeMap<String, String>,
}

/// Describes where a function lives and how to invoke it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Function name as known to the host.
    pub name: String,
    /// Directory containing the function.
    #[serde(default)]
    pub directory: String,
    /// Script or artefact implementing the function.
    pub script_file: String,
    /// Entry point inside the script.
    pub entry_point: String,
}

/// Request to load a function definition into the worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionLoadRequest {
    /// Host-assigned function id.
    pub function_id: String,
    /// Function definition.
    pub metadata: FunctionMetadata,
}

/// Result of a [`FunctionLoadRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionLoadResponse {
    /// Status of the load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatusResult>,
    /// Id of the loaded function.
    #[serde(default)]
    pub function_id: String,
}

/// Health ping from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatusRequest {}

/// Health reply from the worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatusResponse {
    /// Status of the worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatusResult>,
}

/// Request to reload the function application environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEnvironmentReloadRequest {
    /// Directory holding the function application.
    pub function_app_directory: String,
    /// Environment variables to apply.
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

/// Result of a [`FunctionEnvironmentReloadRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEnvironmentReloadResponse {
    /// Status of the reload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatusResult>,
}

/// First message the worker writes when a stream opens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartStream {
    /// Identifier of the worker process.
    pub worker_id: String,
}

/// Severity of an [`RpcLog`] record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Diagnostic detail.
    Trace,
    /// Debugging detail.
    Debug,
    /// Normal operation.
    #[default]
    Information,
    /// Unexpected but recoverable.
    Warning,
    /// A failure.
    Error,
}

/// Log record the worker forwards to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcLog {
    /// Invocation the record belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
    /// Logging category.
    pub category: String,
    /// Severity.
    pub level: LogLevel,
    /// Log text.
    pub message: String,
}

#[cfg(test)]
mod tests;
