//! Error types for audit event logging.

use thiserror::Error;

use crate::sink::SinkError;
use tessera_core::CatalogError;

/// Result type alias using [`AuditError`] as the error type.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors returned to callers of the audit engine.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The event is not defined in the named or default catalog.
    #[error("Unable to locate definition of audit event {event}")]
    UnknownEvent {
        /// Event name.
        event: String,
    },

    /// One or more validation checks failed. `message` holds every failure,
    /// one per line.
    #[error("{message}")]
    Validation {
        /// Event name.
        event: String,
        /// Full accumulated report.
        message: String,
    },

    /// The sink failed to emit an already validated message.
    #[error("Error logging event {event}: {source}")]
    Emission {
        /// Event name.
        event: String,
        /// Sink failure.
        #[source]
        source: SinkError,
    },

    /// Catalog configuration or lookup error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Engine configuration could not be loaded.
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Reason the configuration is invalid.
        reason: String,
    },
}

impl AuditError {
    /// Creates a validation error.
    pub fn validation(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            event: event.into(),
            message: message.into(),
        }
    }

    /// Returns true for [`AuditError::Validation`].
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true for [`AuditError::UnknownEvent`].
    #[must_use]
    pub const fn is_unknown_event(&self) -> bool {
        matches!(self, Self::UnknownEvent { .. })
    }

    /// Returns true for [`AuditError::Emission`].
    #[must_use]
    pub const fn is_emission(&self) -> bool {
        matches!(self, Self::Emission { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_event_display() {
        let err = AuditError::UnknownEvent {
            event: "doesNotExist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to locate definition of audit event doesNotExist"
        );
        assert!(err.is_unknown_event());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_display_is_full_report() {
        let err = AuditError::validation("transfer", "line one\nline two");
        assert_eq!(err.to_string(), "line one\nline two");
        assert!(err.is_validation());
    }

    #[test]
    fn test_emission_display() {
        let err = AuditError::Emission {
            event: "transfer".to_string(),
            source: SinkError::Backend("disk full".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Error logging event transfer: Backend error: disk full"
        );
        assert!(err.is_emission());
    }
}
