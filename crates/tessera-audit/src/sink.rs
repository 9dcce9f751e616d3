//! Sinks that receive validated audit messages.

use std::fmt::Debug;
use std::io::Write;

use parking_lot::Mutex;
use tracing::info;

use crate::message::AuditMessage;

/// Destination for assembled audit messages.
pub trait AuditSink: Send + Sync + Debug {
    /// Emits one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be written.
    fn emit(&self, message: &AuditMessage) -> Result<(), SinkError>;

    /// Flushes any buffered messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Returns the sink name for identification.
    fn name(&self) -> &'static str;
}

/// Errors raised by a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Serialization error
    #[error("Failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Emits each message as a `tracing` event at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingSink {
    fn emit(&self, message: &AuditMessage) -> Result<(), SinkError> {
        info!(event = %message.event_name(), audit = %message, "Audit event");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Keeps every emitted message in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    messages: Mutex<Vec<AuditMessage>>,
}

impl InMemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all emitted messages.
    #[must_use]
    pub fn messages(&self) -> Vec<AuditMessage> {
        self.messages.lock().clone()
    }

    /// Returns all emitted messages in structured-data form.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.messages.lock().iter().map(ToString::to_string).collect()
    }

    /// Returns the number of emitted messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Returns true if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Clears all emitted messages.
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl AuditSink for InMemorySink {
    fn emit(&self, message: &AuditMessage) -> Result<(), SinkError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// Writes each message as one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send + Debug> AuditSink for JsonLinesSink<W> {
    fn emit(&self, message: &AuditMessage) -> Result<(), SinkError> {
        let line = message.to_json()?;
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_lines"
    }
}
