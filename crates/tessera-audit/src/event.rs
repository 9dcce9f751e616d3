//! Typed construction of one audit event.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tessera_core::{is_blank, COMPLETION_STATUS};

use crate::engine::AuditEngine;
use crate::error::{AuditError, Result};
use crate::handler::ExceptionHandler;
use crate::message::AuditMessage;

/// Collects the attributes of one event before validating and logging it.
///
/// ```
/// use tessera_audit::AuditEngine;
/// use tessera_core::{fixtures::basic_catalog, CatalogIndex};
///
/// let engine = AuditEngine::new(CatalogIndex::build(basic_catalog())?);
/// engine.event("login").completion_status("Success")?.log()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EventBuilder<'a> {
    engine: &'a AuditEngine,
    name: String,
    catalog_id: Option<String>,
    attributes: BTreeMap<String, String>,
    handler: Option<Arc<dyn ExceptionHandler>>,
}

impl fmt::Debug for EventBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBuilder")
            .field("name", &self.name)
            .field("catalog_id", &self.catalog_id)
            .field("attributes", &self.attributes)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> EventBuilder<'a> {
    pub(crate) fn new(engine: &'a AuditEngine, name: &str) -> Self {
        Self {
            engine,
            name: name.to_string(),
            catalog_id: None,
            attributes: BTreeMap::new(),
            handler: None,
        }
    }

    /// Looks the event up in `catalog_id` instead of the default catalog.
    #[must_use]
    pub fn catalog(mut self, catalog_id: &str) -> Self {
        self.catalog_id = Some(catalog_id.to_string());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attribute(mut self, name: &str, value: impl ToString) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets several attributes.
    #[must_use]
    pub fn attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the outcome of the audited action.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Validation`] if `status` is blank.
    pub fn completion_status(mut self, status: &str) -> Result<Self> {
        if is_blank(status) {
            return Err(AuditError::validation(&self.name, "Missing completion status"));
        }
        self.attributes
            .insert(COMPLETION_STATUS.to_string(), status.to_string());
        Ok(self)
    }

    /// Uses `handler` for sink failures of this event only.
    #[must_use]
    pub fn exception_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the attributes collected so far.
    #[must_use]
    pub const fn attribute_map(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Validates the event and returns the message without emitting it.
    ///
    /// # Errors
    ///
    /// See [`AuditEngine::validate_and_log`].
    pub fn validate(&self) -> Result<AuditMessage> {
        self.engine
            .validate(&self.name, self.catalog_id.as_deref(), &self.attributes)
    }

    /// Validates the event and emits it.
    ///
    /// # Errors
    ///
    /// See [`AuditEngine::validate_and_log`].
    pub fn log(self) -> Result<()> {
        self.engine.validate_and_log(
            &self.name,
            self.catalog_id.as_deref(),
            &self.attributes,
            self.handler.as_deref(),
        )
    }
}
