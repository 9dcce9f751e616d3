//! Error types for catalog loading and lookup.
//!
//! Everything in this module is either a load-time configuration defect or a
//! "not found" signal. Validation failures are never represented here; they
//! are accumulated as data in [`crate::ValidationErrors`].

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`CatalogError`] as the error type.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while building or querying a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("Failed to read catalog from {path}: {source}")]
    Io {
        /// Path to the catalog file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Catalog document is not valid JSON or does not match the catalog shape.
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// An event references an attribute that exists in neither its own
    /// catalog nor the default catalog.
    #[error("Event {event} in catalog {catalog_id} references undefined attribute {attribute}")]
    UndefinedAttribute {
        /// Event name.
        event: String,
        /// Catalog the event belongs to.
        catalog_id: String,
        /// Name of the unresolved attribute.
        attribute: String,
    },

    /// An attribute carries a constraint whose type is not registered.
    #[error("Attribute {attribute} uses unknown constraint type {constraint_type}")]
    UnknownConstraintType {
        /// Attribute name.
        attribute: String,
        /// Constraint type name as written in the catalog.
        constraint_type: String,
    },

    /// An event name does not fit in the configured maximum key length.
    #[error("Event name {event} is {length} characters long, exceeding the maximum of {max_length}")]
    EventNameTooLong {
        /// Event name.
        event: String,
        /// Actual length.
        length: usize,
        /// Configured maximum.
        max_length: usize,
    },

    /// The same event name appears twice in one catalog.
    #[error("Event {event} is defined more than once in catalog {catalog_id}")]
    DuplicateEvent {
        /// Event name.
        event: String,
        /// Catalog id.
        catalog_id: String,
    },

    /// The same attribute name appears twice in one catalog.
    #[error("Attribute {attribute} is defined more than once in catalog {catalog_id}")]
    DuplicateAttribute {
        /// Attribute name.
        attribute: String,
        /// Catalog id.
        catalog_id: String,
    },

    /// The requested event is not defined in the named or default catalog.
    #[error("Event {event} not found in catalog {catalog_id}")]
    EventNotFound {
        /// Event name.
        event: String,
        /// Catalog that was searched first.
        catalog_id: String,
    },
}

impl CatalogError {
    /// Returns true if this error is a lookup miss rather than a configuration defect.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_undefined_attribute() {
        let err = CatalogError::UndefinedAttribute {
            event: "transfer".to_string(),
            catalog_id: "DEFAULT".to_string(),
            attribute: "memo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Event transfer in catalog DEFAULT references undefined attribute memo"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_display_event_name_too_long() {
        let err = CatalogError::EventNameTooLong {
            event: "x".repeat(40),
            length: 40,
            max_length: 32,
        };
        assert!(err.to_string().contains("exceeding the maximum of 32"));
    }

    #[test]
    fn test_not_found_is_distinguishable() {
        let err = CatalogError::EventNotFound {
            event: "doesNotExist".to_string(),
            catalog_id: "DEFAULT".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Event doesNotExist not found in catalog DEFAULT");
    }
}
