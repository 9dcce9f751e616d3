//! Hands validated messages to the sink and applies the failure policy.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::Result;
use crate::handler::{ExceptionHandler, FailLoudHandler};
use crate::message::AuditMessage;
use crate::sink::{AuditSink, TracingSink};

/// Sends messages to one sink.
///
/// A sink failure goes to the per-call handler if one is given, otherwise
/// to the default handler, which re-raises unless reconfigured.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn AuditSink>,
    default_handler: Arc<dyn ExceptionHandler>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sink", &self.sink.name())
            .finish_non_exhaustive()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink::new()))
    }
}

impl Dispatcher {
    /// Creates a dispatcher with the fail-loud default handler.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            default_handler: Arc::new(FailLoudHandler),
        }
    }

    /// Replaces the default handler.
    #[must_use]
    pub fn with_default_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.default_handler = handler;
        self
    }

    /// Returns the sink.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn AuditSink> {
        &self.sink
    }

    /// Emits `message`, routing any sink failure through a handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the selected handler returns.
    pub fn dispatch(
        &self,
        message: &AuditMessage,
        handler: Option<&dyn ExceptionHandler>,
    ) -> Result<()> {
        match self.sink.emit(message) {
            Ok(()) => {
                debug!(event = %message.event_name(), sink = self.sink.name(), "Audit event emitted");
                Ok(())
            }
            Err(e) => {
                error!(
                    event = %message.event_name(),
                    sink = self.sink.name(),
                    error = %e,
                    "Audit sink failed"
                );
                handler
                    .unwrap_or(self.default_handler.as_ref())
                    .handle(message, e)
            }
        }
    }
}
