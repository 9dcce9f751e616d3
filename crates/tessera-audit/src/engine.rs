//! Validation and assembly of audit events.
//!
//! [`AuditEngine::validate_and_log`] checks the caller's attributes and the
//! ambient request context against the catalog, assembles an
//! [`AuditMessage`] and hands it to the [`Dispatcher`].
//!
//! Caller data is checked first: required attributes, their constraints and
//! undeclared keys, reported together. Keys that name a request-context
//! attribute or differ from their normalized form are then rejected on their
//! own. Request context comes last: required keys for the event, required
//! keys for the whole catalog, and constraints on context values. Each round
//! reports every problem it finds, one per line, and only runs when the
//! previous one passed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tessera_core::{
    CatalogData, CatalogIndex, CatalogManager, CatalogSource, ConstraintRegistry,
    Event, SharedCatalogManager, ValidationErrors, COMPLETION_STATUS,
};
use tracing::{debug, instrument};

use crate::config::AuditConfig;
use crate::context::{ContextSource, ThreadContext};
use crate::dispatch::Dispatcher;
use crate::error::{AuditError, Result};
use crate::event::EventBuilder;
use crate::handler::ExceptionHandler;
use crate::message::AuditMessage;
use crate::sink::{AuditSink, TracingSink};

/// Validates audit events and sends them to a sink.
///
/// The engine is immutable once built and can be shared between threads.
/// Each call takes one catalog snapshot and uses it throughout.
pub struct AuditEngine {
    catalog: Arc<dyn CatalogSource>,
    registry: Arc<ConstraintRegistry>,
    context: Arc<dyn ContextSource>,
    dispatcher: Dispatcher,
    max_key_length: usize,
}

impl fmt::Debug for AuditEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditEngine")
            .field("registry", &self.registry.names())
            .field("context", &self.context)
            .field("dispatcher", &self.dispatcher)
            .field("max_key_length", &self.max_key_length)
            .finish_non_exhaustive()
    }
}

impl AuditEngine {
    /// Returns a builder reading definitions from `catalog`.
    #[must_use]
    pub fn builder(catalog: impl CatalogSource + 'static) -> AuditEngineBuilder {
        AuditEngineBuilder::new(Arc::new(catalog))
    }

    /// Creates an engine over a fixed catalog with default settings.
    #[must_use]
    pub fn new(index: CatalogIndex) -> Self {
        Self::builder(Arc::new(index)).build()
    }

    /// Loads the catalog named by `config.catalog_path` and builds an engine
    /// that emits to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] if no catalog path is configured and
    /// [`AuditError::Catalog`] if the catalog cannot be read or built.
    pub fn from_config(config: AuditConfig, sink: Arc<dyn AuditSink>) -> Result<Self> {
        let Some(path) = config.catalog_path.as_ref() else {
            return Err(AuditError::Config {
                reason: "catalogPath is not set".to_string(),
            });
        };
        let data = CatalogData::from_path(path)?;
        let index = CatalogIndex::builder()
            .max_key_length(config.max_key_length)
            .build(data)?;
        Ok(Self::builder(SharedCatalogManager::new(index))
            .config(config)
            .sink(sink)
            .build())
    }

    /// Returns the maximum message key length.
    #[must_use]
    pub const fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// Returns the current catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> Arc<dyn CatalogManager> {
        self.catalog.current()
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Starts a typed event.
    #[must_use]
    pub fn event(&self, name: &str) -> EventBuilder<'_> {
        EventBuilder::new(self, name)
    }

    /// Returns the attribute names a caller may supply for an event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::UnknownEvent`] if the event is not defined.
    pub fn attribute_names(&self, event_name: &str, catalog_id: Option<&str>) -> Result<Vec<String>> {
        self.catalog()
            .get_attribute_names(event_name, catalog_id)
            .map_err(|e| unknown_or_catalog(event_name, e.into()))
    }

    /// Validates an event, assembles the message and emits it.
    ///
    /// A sink failure is passed to `handler`, or to the default handler when
    /// `handler` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::UnknownEvent`] if the event is not defined,
    /// [`AuditError::Validation`] with the full report if any check fails,
    /// or whatever the handler returns for a sink failure.
    pub fn validate_and_log(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
        attributes: &BTreeMap<String, String>,
        handler: Option<&dyn ExceptionHandler>,
    ) -> Result<()> {
        let message = self.validate(event_name, catalog_id, attributes)?;
        self.dispatcher.dispatch(&message, handler)
    }

    /// Logs an event from the default catalog with the default handler.
    ///
    /// # Errors
    ///
    /// See [`validate_and_log`](Self::validate_and_log).
    pub fn log_event(&self, event_name: &str, attributes: &BTreeMap<String, String>) -> Result<()> {
        self.validate_and_log(event_name, None, attributes, None)
    }

    /// Runs every check and returns the assembled message without emitting it.
    ///
    /// # Errors
    ///
    /// See [`validate_and_log`](Self::validate_and_log).
    pub fn validate(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
        attributes: &BTreeMap<String, String>,
    ) -> Result<AuditMessage> {
        self.validate_with_context(event_name, catalog_id, attributes, self.context.as_ref())
    }

    /// Like [`validate`](Self::validate) but reads request context from `context`.
    ///
    /// # Errors
    ///
    /// See [`validate_and_log`](Self::validate_and_log).
    #[instrument(level = "debug", skip(self, attributes, context), fields(attributes = attributes.len()))]
    pub fn validate_with_context(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
        attributes: &BTreeMap<String, String>,
        context: &dyn ContextSource,
    ) -> Result<AuditMessage> {
        let catalog = self.catalog.current();
        let Some(event) = catalog.get_event(event_name, catalog_id) else {
            debug!(event = event_name, ?catalog_id, "Unknown audit event");
            return Err(AuditError::UnknownEvent {
                event: event_name.to_string(),
            });
        };

        let check = EventCheck {
            catalog: catalog.as_ref(),
            registry: &self.registry,
            event: &event,
            event_name,
            catalog_id,
        };
        check.caller_attributes(attributes)?;
        check.declared_names(attributes)?;
        check.request_context(context)?;

        let mut message = AuditMessage::new(event_name, self.max_key_length);
        let mut errors = ValidationErrors::new();
        for (key, value) in attributes {
            if let Err(e) = message.put(key, value) {
                errors.push(e.to_string());
            }
        }
        fail_on(event_name, errors)?;
        Ok(message)
    }
}

fn unknown_or_catalog(event_name: &str, error: AuditError) -> AuditError {
    match error {
        AuditError::Catalog(e) if e.is_not_found() => AuditError::UnknownEvent {
            event: event_name.to_string(),
        },
        other => other,
    }
}

fn fail_on(event_name: &str, errors: ValidationErrors) -> Result<()> {
    errors.into_result().map_err(|message| {
        debug!(event = event_name, %message, "Audit event failed validation");
        AuditError::validation(event_name, message)
    })
}

struct EventCheck<'a> {
    catalog: &'a dyn CatalogManager,
    registry: &'a ConstraintRegistry,
    event: &'a Event,
    event_name: &'a str,
    catalog_id: Option<&'a str>,
}

impl EventCheck<'_> {
    fn caller_attributes(&self, attributes: &BTreeMap<String, String>) -> Result<()> {
        let resolved = self
            .catalog
            .get_attributes(self.event_name, Some(&self.event.catalog_id))?;

        let mut errors = ValidationErrors::new();
        let mut missing = Vec::new();

        for reference in &self.event.attributes {
            let Some(attribute) = resolved.get(&reference.name) else {
                continue;
            };
            if attribute.request_context {
                continue;
            }
            if !(attribute.required || reference.forces_required()) {
                continue;
            }
            match attributes.get(&reference.name) {
                None => missing.push(reference.name.as_str()),
                Some(value) => {
                    for constraint in &attribute.constraints {
                        self.registry.evaluate(
                            false,
                            constraint.type_name(),
                            &reference.name,
                            value,
                            &constraint.value,
                            &mut errors,
                        );
                    }
                }
            }
        }

        for key in attributes.keys() {
            if key != COMPLETION_STATUS && !resolved.contains_key(key) {
                errors.push(format!(
                    "Attribute {key} is not defined for event {}",
                    self.event_name
                ));
            }
        }

        if !missing.is_empty() {
            errors.push(format!(
                "Event {} is missing required attribute(s) {}",
                self.event_name,
                missing.join(", ")
            ));
        }
        fail_on(self.event_name, errors)
    }

    fn declared_names(&self, attributes: &BTreeMap<String, String>) -> Result<()> {
        let names = self
            .catalog
            .get_attribute_names(self.event_name, Some(&self.event.catalog_id))?;
        let invalid: Vec<&str> = attributes
            .keys()
            .filter(|key| *key != COMPLETION_STATUS && !names.contains(*key))
            .map(String::as_str)
            .collect();
        if invalid.is_empty() {
            return Ok(());
        }
        let mut errors = ValidationErrors::new();
        errors.push(format!(
            "Event {} contains invalid attribute(s) {}",
            self.event_name,
            invalid.join(", ")
        ));
        fail_on(self.event_name, errors)
    }

    fn request_context(&self, context: &dyn ContextSource) -> Result<()> {
        let mut errors = ValidationErrors::new();

        let required = self
            .catalog
            .get_required_context_attributes(self.event_name, Some(&self.event.catalog_id))?;
        let missing: Vec<&str> = required
            .iter()
            .filter(|key| !context.contains_key(key))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            errors.push(format!(
                "Event {} is missing required RequestContextMapping values for {}",
                self.event_name,
                missing.join(", ")
            ));
        }

        let catalog_wide = self.catalog.get_request_context_attributes();
        let missing: Vec<&str> = catalog_wide
            .iter()
            .filter(|(key, attribute)| attribute.required && !context.contains_key(key))
            .map(|(key, _)| key.as_str())
            .collect();
        if !missing.is_empty() {
            errors.push(format!(
                "Event {} is missing required Thread Context values for {}",
                self.event_name,
                missing.join(", ")
            ));
        }

        let mut invalid = ValidationErrors::new();
        for (key, attribute) in &catalog_wide {
            let Some(value) = context.get(key) else {
                continue;
            };
            for constraint in &attribute.constraints {
                self.registry.evaluate(
                    true,
                    constraint.type_name(),
                    key,
                    &value,
                    &constraint.value,
                    &mut invalid,
                );
            }
        }
        if !invalid.is_empty() {
            errors.push(format!(
                "Event {} has incorrect data in the Thread Context: {invalid}",
                self.event_name
            ));
        }

        if !errors.is_empty() {
            debug!(
                event = self.event_name,
                catalog_id = ?self.catalog_id,
                "Request context rejected"
            );
        }
        fail_on(self.event_name, errors)
    }
}

/// Builder for [`AuditEngine`].
pub struct AuditEngineBuilder {
    catalog: Arc<dyn CatalogSource>,
    registry: Arc<ConstraintRegistry>,
    context: Arc<dyn ContextSource>,
    sink: Arc<dyn AuditSink>,
    default_handler: Option<Arc<dyn ExceptionHandler>>,
    config: AuditConfig,
}

impl fmt::Debug for AuditEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditEngineBuilder")
            .field("sink", &self.sink.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AuditEngineBuilder {
    fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            registry: ConstraintRegistry::shared(),
            context: Arc::new(ThreadContext),
            sink: Arc::new(TracingSink::new()),
            default_handler: None,
            config: AuditConfig::default(),
        }
    }

    /// Sets the constraint registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ConstraintRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Sets where request-context values are read from.
    #[must_use]
    pub fn context(mut self, context: Arc<dyn ContextSource>) -> Self {
        self.context = context;
        self
    }

    /// Sets the sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the default handler, overriding the configured policy.
    #[must_use]
    pub fn default_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.default_handler = Some(handler);
        self
    }

    /// Applies key length and emission policy from a configuration.
    #[must_use]
    pub fn config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> AuditEngine {
        let handler = self
            .default_handler
            .unwrap_or_else(|| self.config.emission_failure.handler());
        AuditEngine {
            catalog: self.catalog,
            registry: self.registry,
            context: self.context,
            dispatcher: Dispatcher::new(self.sink).with_default_handler(handler),
            max_key_length: self.config.max_key_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::sink::InMemorySink;
    use tessera_core::{Attribute, CatalogData};

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn engine(data: CatalogData) -> (AuditEngine, Arc<InMemorySink>) {
        let sink = Arc::new(InMemorySink::new());
        let engine = AuditEngine::builder(Arc::new(CatalogIndex::build(data).unwrap()))
            .context(Arc::new(RequestContext::new()))
            .sink(sink.clone())
            .build();
        (engine, sink)
    }

    fn note_catalog() -> CatalogData {
        CatalogData::new()
            .with_attribute(Attribute::new("text").required(true).constraint("maxLength", "5"))
            .with_attribute(Attribute::new("tag").constraint("enum", "a,b"))
            .with_attribute(Attribute::new("flag"))
            .with_attribute(Attribute::new("code").constraint("pattern", "[0-9]+"))
            .with_event(
                Event::new("note")
                    .attribute("text")
                    .attribute("tag")
                    .attribute_required("flag", false)
                    .attribute_required("code", true),
            )
    }

    #[test]
    fn test_unknown_key_and_missing_are_reported_together() {
        let (engine, sink) = engine(note_catalog());
        let err = engine
            .log_event("note", &attrs(&[("code", "x1"), ("color", "red")]))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "code does not match pattern [0-9]+\n\
             Attribute color is not defined for event note\n\
             Event note is missing required attribute(s) text"
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_optional_attribute_constraints_are_skipped() {
        let (engine, sink) = engine(note_catalog());
        engine
            .log_event("note", &attrs(&[("text", "hi"), ("code", "7"), ("tag", "z")]))
            .unwrap();
        assert_eq!(
            sink.rendered(),
            vec![r#"[note code="7" tag="z" text="hi"]"#.to_string()]
        );
    }

    #[test]
    fn test_dotted_attribute_name_is_invalid() {
        let data = CatalogData::new()
            .with_attribute(Attribute::new("account.id"))
            .with_event(Event::new("open").attribute("account.id"));
        let (engine, sink) = engine(data);
        let err = engine
            .log_event("open", &attrs(&[("account.id", "1")]))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Event open contains invalid attribute(s) account.id");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_false_override_does_not_relax_requiredness() {
        let data = CatalogData::new()
            .with_attribute(Attribute::new("id").required(true))
            .with_event(Event::new("ping").attribute_required("id", false));
        let (engine, _) = engine(data);
        let err = engine.validate("ping", None, &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("missing required attribute(s) id"));
    }

    #[test]
    fn test_completion_status_always_allowed() {
        let (engine, sink) = engine(note_catalog());
        engine
            .log_event(
                "note",
                &attrs(&[("text", "hi"), ("code", "1"), ("completionStatus", "Success")]),
            )
            .unwrap();
        assert_eq!(
            sink.rendered(),
            vec![r#"[note code="1" completionStatus="Success" text="hi"]"#.to_string()]
        );
    }

    #[test]
    fn test_message_key_length_limit() {
        let data = CatalogData::new()
            .with_attribute(Attribute::new("aVeryLongAttributeName"))
            .with_event(Event::new("x").attribute("aVeryLongAttributeName"));
        let sink = Arc::new(InMemorySink::new());
        let engine = AuditEngine::builder(Arc::new(CatalogIndex::build(data).unwrap()))
            .context(Arc::new(RequestContext::new()))
            .config(AuditConfig::default().with_max_key_length(10))
            .sink(sink.clone())
            .build();
        let err = engine
            .log_event("x", &attrs(&[("aVeryLongAttributeName", "1")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute aVeryLongAttributeName exceeds the maximum key length of 10"
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_attribute_names_maps_not_found() {
        let (engine, _) = engine(note_catalog());
        assert_eq!(
            engine.attribute_names("note", None).unwrap(),
            vec!["text", "tag", "flag", "code"]
        );
        assert!(engine.attribute_names("nothing", None).unwrap_err().is_unknown_event());
    }

    #[test]
    fn test_from_config_requires_catalog_path() {
        let err = AuditEngine::from_config(AuditConfig::default(), Arc::new(InMemorySink::new()))
            .unwrap_err();
        assert!(matches!(err, AuditError::Config { .. }));
    }
}
