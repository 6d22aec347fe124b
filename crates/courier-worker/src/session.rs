//! JSONL session loop between the host and the dispatcher.
//!
//! A session opens with a `start_stream` frame, then answers every inbound
//! envelope with exactly one outbound frame until the host closes the stream.
//! Envelopes that cannot be parsed or routed are answered with an `rpc_log`
//! error record instead of ending the session.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use courier_protocol::{LogLevel, MessageWriter, ProtocolError, StreamingMessage};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::handler::{HandlerError, HandlerLogger};
use crate::outbound::{rpc_log, start_stream};

/// Tracing target for session events.
pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading from the host stream failed.
    #[error("failed to read from host: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing a frame to the host failed.
    #[error("failed to write to host: {0}")]
    Write(#[source] ProtocolError),

    /// A worker-initiated message could not be generated.
    #[error("failed to generate outbound message: {0}")]
    Outbound(#[from] HandlerError),
}

/// Counts reported when the host closes the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Envelopes answered by a handler.
    pub handled: usize,
    /// Envelopes answered with an error record.
    pub rejected: usize,
}

/// Runs a session until `reader` reaches end of stream.
///
/// # Errors
///
/// Returns [`SessionError`] when the host stream cannot be read or written.
/// Per-message failures are answered in-band and do not end the session.
pub fn run_session(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    dispatcher: &mut Dispatcher,
    worker_id: &str,
    logger: &Arc<dyn HandlerLogger>,
) -> Result<SessionSummary, SessionError> {
    let mut frames = MessageWriter::new(writer);
    let opener = start_stream(worker_id, Arc::clone(logger))?;
    frames.write_message(&opener).map_err(SessionError::Write)?;
    info!(target: SESSION_TARGET, worker_id, "stream opened");

    let mut summary = SessionSummary::default();
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| SessionError::Read { source })?;
        if read == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let reply = match StreamingMessage::parse(&line) {
            Ok(message) => match dispatcher.dispatch(&message) {
                Ok(reply) => {
                    summary.handled += 1;
                    reply
                }
                Err(error) => {
                    warn!(
                        target: SESSION_TARGET,
                        request_id = message.request_id(),
                        %error,
                        "dispatch failed"
                    );
                    summary.rejected += 1;
                    rejection(Some(message.request_id()), &error, logger)?
                }
            },
            Err(error) => {
                warn!(target: SESSION_TARGET, %error, "malformed message");
                summary.rejected += 1;
                rejection(None, &error, logger)?
            }
        };
        frames.write_message(&reply).map_err(SessionError::Write)?;
    }

    debug!(
        target: SESSION_TARGET,
        handled = summary.handled,
        rejected = summary.rejected,
        "stream closed by host"
    );
    Ok(summary)
}

fn rejection(
    request_id: Option<&str>,
    error: &dyn std::error::Error,
    logger: &Arc<dyn HandlerLogger>,
) -> Result<StreamingMessage, SessionError> {
    Ok(rpc_log(
        request_id.filter(|id| !id.is_empty()),
        LogLevel::Error,
        error.to_string(),
        Arc::clone(logger),
    )?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use courier_protocol::{Content, RpcLog};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::operations::FunctionCatalog;
    use crate::tests::support::RecordingLogger;

    #[fixture]
    fn logger() -> Arc<dyn HandlerLogger> {
        RecordingLogger::shared()
    }

    fn run(
        input: &str,
        logger: &Arc<dyn HandlerLogger>,
    ) -> (SessionSummary, Vec<StreamingMessage>) {
        let mut dispatcher =
            Dispatcher::with_default_handlers(FunctionCatalog::new(), Arc::clone(logger));
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let summary = run_session(&mut reader, &mut output, &mut dispatcher, "worker-1", logger)
            .expect("session");
        let frames = String::from_utf8(output)
            .expect("utf8")
            .lines()
            .map(|line| StreamingMessage::parse(line.as_bytes()).expect("frame"))
            .collect();
        (summary, frames)
    }

    fn error_record(message: &StreamingMessage) -> &RpcLog {
        match message.content() {
            Content::RpcLog(record) => {
                assert_eq!(record.level, LogLevel::Error);
                record
            }
            other => panic!("expected an error record, got {other:?}"),
        }
    }

    #[rstest]
    fn empty_stream_only_opens(logger: Arc<dyn HandlerLogger>) {
        let (summary, frames) = run("", &logger);

        assert_eq!(summary, SessionSummary::default());
        assert_eq!(frames.len(), 1);
        assert!(matches!(
            frames.first().map(StreamingMessage::content),
            Some(Content::StartStream(opener)) if opener.worker_id == "worker-1"
        ));
    }

    #[rstest]
    fn answers_each_message_in_order(logger: Arc<dyn HandlerLogger>) {
        let input = concat!(
            r#"{"request_id":"a","content":{"kind":"worker_status_request"}}"#,
            "\n\n",
            r#"{"request_id":"b","content":{"kind":"worker_init_request","host_version":"4.1"}}"#,
            "\n",
        );

        let (summary, frames) = run(input, &logger);

        assert_eq!(summary, SessionSummary { handled: 2, rejected: 0 });
        let ids: Vec<&str> = frames.iter().map(StreamingMessage::request_id).collect();
        assert_eq!(ids, vec!["", "a", "b"]);
        assert!(matches!(
            frames.get(2).map(StreamingMessage::content),
            Some(Content::WorkerInitResponse(_))
        ));
    }

    #[rstest]
    fn malformed_line_is_answered_and_skipped(logger: Arc<dyn HandlerLogger>) {
        let input = concat!(
            "not json\n",
            r#"{"request_id":"ok","content":{"kind":"worker_status_request"}}"#,
            "\n",
        );

        let (summary, frames) = run(input, &logger);

        assert_eq!(summary, SessionSummary { handled: 1, rejected: 1 });
        let record = error_record(frames.get(1).expect("error frame"));
        assert_eq!(record.invocation_id, None);
        assert!(record.message.starts_with("malformed JSONL"));
        assert_eq!(frames.get(2).map(StreamingMessage::request_id), Some("ok"));
    }

    #[rstest]
    fn unhandled_kind_is_answered_with_its_request_id(logger: Arc<dyn HandlerLogger>) {
        let input = concat!(
            r#"{"request_id":"x","content":{"kind":"start_stream","worker_id":"host"}}"#,
            "\n",
        );

        let (summary, frames) = run(input, &logger);

        assert_eq!(summary, SessionSummary { handled: 0, rejected: 1 });
        let reply = frames.get(1).expect("error frame");
        assert_eq!(reply.request_id(), "x");
        assert_eq!(
            error_record(reply).message,
            "no handler registered for start_stream"
        );
    }

    #[rstest]
    fn write_failure_ends_the_session(logger: Arc<dyn HandlerLogger>) {
        struct BrokenPipe;

        impl Write for BrokenPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut dispatcher = Dispatcher::new();
        let mut reader = Cursor::new(Vec::new());
        let error = run_session(&mut reader, &mut BrokenPipe, &mut dispatcher, "w", &logger)
            .expect_err("write should fail");

        assert!(matches!(error, SessionError::Write(_)));
    }
}
