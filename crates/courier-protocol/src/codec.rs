//! JSONL framing for outbound envelopes.
//!
//! Each [`StreamingMessage`] is written as one JSON object followed by a
//! newline, and the sink is flushed so the host sees complete frames.

use std::io::Write;

use crate::error::ProtocolError;
use crate::message::StreamingMessage;

/// Writer that frames envelopes as JSONL lines.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: Write> MessageWriter<W> {
    /// Wraps the given output stream.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one envelope as a JSONL line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or flushing fails.
    pub fn write_message(&mut self, message: &StreamingMessage) -> Result<(), ProtocolError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consumes the writer and returns the wrapped stream.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Content, StartStream};

    #[test]
    fn writes_one_line_per_message() {
        let mut writer = MessageWriter::new(Vec::new());
        let message = StreamingMessage::new(
            "",
            Content::StartStream(StartStream {
                worker_id: String::from("w"),
            }),
        );
        writer.write_message(&message).expect("write first");
        writer.write_message(&message).expect("write second");

        let output = String::from_utf8(writer.into_inner()).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));
        let parsed = StreamingMessage::parse(lines[0].as_bytes()).expect("parse back");
        assert_eq!(parsed, message);
    }
}
