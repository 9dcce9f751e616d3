//! Policies for sink failures.
//!
//! A validated message that the sink could not emit is handed to an
//! [`ExceptionHandler`]. The handler either re-raises (the default) or
//! absorbs the failure.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::AuditError;
use crate::message::AuditMessage;
use crate::sink::SinkError;

/// Decides what happens when a sink fails.
pub trait ExceptionHandler: Send + Sync {
    /// Handles a failed emission.
    ///
    /// # Errors
    ///
    /// Returning an error makes the whole `log` call fail with it.
    fn handle(&self, message: &AuditMessage, error: SinkError) -> Result<(), AuditError>;
}

impl<F> ExceptionHandler for F
where
    F: Fn(&AuditMessage, SinkError) -> Result<(), AuditError> + Send + Sync,
{
    fn handle(&self, message: &AuditMessage, error: SinkError) -> Result<(), AuditError> {
        self(message, error)
    }
}

/// Re-raises every failure as [`AuditError::Emission`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailLoudHandler;

impl ExceptionHandler for FailLoudHandler {
    fn handle(&self, message: &AuditMessage, error: SinkError) -> Result<(), AuditError> {
        Err(AuditError::Emission {
            event: message.event_name().to_string(),
            source: error,
        })
    }
}

/// Drops every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl ExceptionHandler for NoopHandler {
    fn handle(&self, message: &AuditMessage, error: SinkError) -> Result<(), AuditError> {
        debug!(event = %message.event_name(), error = %error, "Ignoring audit emission failure");
        Ok(())
    }
}

/// Logs every failure and continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl ExceptionHandler for LoggingHandler {
    fn handle(&self, message: &AuditMessage, error: SinkError) -> Result<(), AuditError> {
        error!(event = %message.event_name(), audit = %message, error = %error, "Error logging event");
        Ok(())
    }
}

/// Configurable choice of default handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionPolicy {
    /// Re-raise, see [`FailLoudHandler`].
    #[default]
    Fail,
    /// Drop, see [`NoopHandler`].
    Ignore,
    /// Log and continue, see [`LoggingHandler`].
    Log,
}

impl EmissionPolicy {
    /// Returns the handler implementing this policy.
    #[must_use]
    pub fn handler(self) -> Arc<dyn ExceptionHandler> {
        match self {
            Self::Fail => Arc::new(FailLoudHandler),
            Self::Ignore => Arc::new(NoopHandler),
            Self::Log => Arc::new(LoggingHandler),
        }
    }
}
