//! Shared test doubles.

use std::sync::{Arc, Mutex};

use crate::handler::HandlerLogger;

/// One captured logger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogEntry {
    Info(String),
    Error { message: String, error: String },
}

/// Logger that records every call for later assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("logger lock").clone()
    }

    pub(crate) fn infos(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Info(message) => Some(message),
                LogEntry::Error { .. } => None,
            })
            .collect()
    }

    pub(crate) fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Error { message, .. } => Some(message),
                LogEntry::Info(_) => None,
            })
            .collect()
    }
}

impl HandlerLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.entries
            .lock()
            .expect("logger lock")
            .push(LogEntry::Info(message.to_owned()));
    }

    fn error(&self, message: &str, error: &anyhow::Error) {
        self.entries
            .lock()
            .expect("logger lock")
            .push(LogEntry::Error {
                message: message.to_owned(),
                error: error.to_string(),
            });
    }
}
