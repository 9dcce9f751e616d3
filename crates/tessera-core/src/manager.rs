//! Catalog manager: indexed, read-only lookup of events and attributes.
//!
//! A [`CatalogIndex`] is an immutable snapshot built once from
//! [`CatalogData`]. Every event is resolved against its own catalog first and
//! the default catalog second; an attribute that resolves nowhere is a build
//! error. [`SharedCatalogManager`] wraps a snapshot so it can be replaced at
//! runtime without readers ever observing a partially built catalog.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::constraint::ConstraintRegistry;
use crate::error::{CatalogError, Result};
use crate::model::{Attribute, CatalogData, Category, Event, Product, DEFAULT_CATALOG};

/// Default limit on the length of event names and message keys.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 32;

/// Storage prefix carried by some request-context attribute names.
pub const REQUEST_CONTEXT_PREFIX: &str = "ReqCtx_";

/// Read-only lookup of catalog definitions.
///
/// `catalog_id` of `None` means the default catalog. A named catalog that
/// lacks an entry falls back to the default catalog's entry.
pub trait CatalogManager: Send + Sync + Debug {
    /// Finds an event definition.
    fn get_event(&self, name: &str, catalog_id: Option<&str>) -> Option<Arc<Event>>;

    /// Finds an attribute definition.
    fn get_attribute(&self, name: &str, catalog_id: Option<&str>) -> Option<Arc<Attribute>>;

    /// Resolves every attribute declared on an event, keyed by attribute name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] if the event is unknown.
    fn get_attributes(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
    ) -> Result<BTreeMap<String, Arc<Attribute>>>;

    /// Returns the normalized names of the event's non request-context attributes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] if the event is unknown.
    fn get_attribute_names(&self, event_name: &str, catalog_id: Option<&str>) -> Result<Vec<String>>;

    /// Returns the normalized names of the request-context keys the event requires.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] if the event is unknown.
    fn get_required_context_attributes(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Returns every request-context attribute in the catalog, keyed by name.
    fn get_request_context_attributes(&self) -> BTreeMap<String, Arc<Attribute>>;
}

/// Something that hands out a consistent catalog view per call.
pub trait CatalogSource: Send + Sync {
    /// Returns the catalog view to use for one whole validation.
    fn current(&self) -> Arc<dyn CatalogManager>;
}

impl<M: CatalogManager + 'static> CatalogSource for Arc<M> {
    fn current(&self) -> Arc<dyn CatalogManager> {
        Arc::clone(self) as Arc<dyn CatalogManager>
    }
}

/// Strips `.` and `/` from an attribute name to form a message key.
///
/// ```
/// use tessera_core::normalize_key;
///
/// assert_eq!(normalize_key("account.id/primary"), "accountidprimary");
/// ```
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.chars().filter(|c| *c != '.' && *c != '/').collect()
}

fn context_key(name: &str) -> String {
    let key = normalize_key(name);
    match key.strip_prefix(REQUEST_CONTEXT_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => key,
    }
}

#[derive(Debug)]
struct EventInfo {
    event: Arc<Event>,
    attributes: BTreeMap<String, Arc<Attribute>>,
    attribute_names: Vec<String>,
    required_context: Vec<String>,
}

#[derive(Debug, Default)]
struct Partition {
    events: HashMap<String, EventInfo>,
    attributes: HashMap<String, Arc<Attribute>>,
}

/// Options used when building a [`CatalogIndex`].
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    max_key_length: usize,
    registry: Arc<ConstraintRegistry>,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            registry: ConstraintRegistry::shared(),
        }
    }
}

impl IndexBuilder {
    /// Sets the maximum event name length.
    #[must_use]
    pub const fn max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }

    /// Sets the registry used to check constraint type names.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ConstraintRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Builds the index.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an event references an undefined
    /// attribute, an event name exceeds the maximum key length, a constraint
    /// type is not registered, or a name is defined twice in one catalog.
    pub fn build(self, data: CatalogData) -> Result<CatalogIndex> {
        CatalogIndex::build_with(data, self)
    }
}

/// Immutable, indexed snapshot of a catalog.
#[derive(Debug)]
pub struct CatalogIndex {
    partitions: HashMap<String, Partition>,
    request_context: BTreeMap<String, Arc<Attribute>>,
    products: Vec<Product>,
    categories: Vec<Category>,
    options: IndexBuilder,
}

impl CatalogIndex {
    /// Returns a builder with the default key length and built-in constraints.
    #[must_use]
    pub fn builder() -> IndexBuilder {
        IndexBuilder::default()
    }

    /// Builds an index with default options.
    ///
    /// # Errors
    ///
    /// See [`IndexBuilder::build`].
    pub fn build(data: CatalogData) -> Result<Self> {
        IndexBuilder::default().build(data)
    }

    fn build_with(data: CatalogData, options: IndexBuilder) -> Result<Self> {
        let mut partitions: HashMap<String, Partition> = HashMap::new();
        partitions.entry(DEFAULT_CATALOG.to_string()).or_default();

        for attribute in data.attributes {
            for constraint in &attribute.constraints {
                if !options.registry.contains(constraint.type_name()) {
                    return Err(CatalogError::UnknownConstraintType {
                        attribute: attribute.name.clone(),
                        constraint_type: constraint.type_name().to_string(),
                    });
                }
            }
            let partition = partitions.entry(attribute.catalog_id.clone()).or_default();
            if partition.attributes.contains_key(&attribute.name) {
                return Err(CatalogError::DuplicateAttribute {
                    attribute: attribute.name,
                    catalog_id: attribute.catalog_id,
                });
            }
            partition
                .attributes
                .insert(attribute.name.clone(), Arc::new(attribute));
        }

        let mut infos: Vec<EventInfo> = Vec::with_capacity(data.events.len());
        for event in data.events {
            let length = event.name.chars().count();
            if length > options.max_key_length {
                return Err(CatalogError::EventNameTooLong {
                    event: event.name,
                    length,
                    max_length: options.max_key_length,
                });
            }
            infos.push(Self::event_info(&partitions, event)?);
        }

        for info in infos {
            let partition = partitions.entry(info.event.catalog_id.clone()).or_default();
            if partition.events.contains_key(&info.event.name) {
                return Err(CatalogError::DuplicateEvent {
                    event: info.event.name.clone(),
                    catalog_id: info.event.catalog_id.clone(),
                });
            }
            partition.events.insert(info.event.name.clone(), info);
        }

        let mut request_context = BTreeMap::new();
        let mut catalog_ids: Vec<&str> = partitions.keys().map(String::as_str).collect();
        catalog_ids.sort_by_key(|id| (*id != DEFAULT_CATALOG, *id));
        for catalog_id in catalog_ids {
            for (name, attribute) in &partitions[catalog_id].attributes {
                if attribute.request_context {
                    request_context
                        .entry(name.clone())
                        .or_insert_with(|| Arc::clone(attribute));
                }
            }
        }

        let index = Self {
            partitions,
            request_context,
            products: data.products,
            categories: data.categories,
            options,
        };
        info!(
            catalogs = index.partitions.len(),
            events = index.event_count(),
            attributes = index.attribute_count(),
            request_context_attributes = index.request_context.len(),
            "Catalog loaded"
        );
        Ok(index)
    }

    fn resolve_in(
        partitions: &HashMap<String, Partition>,
        name: &str,
        catalog_id: &str,
    ) -> Option<Arc<Attribute>> {
        partitions
            .get(catalog_id)
            .and_then(|p| p.attributes.get(name))
            .or_else(|| {
                partitions
                    .get(DEFAULT_CATALOG)
                    .and_then(|p| p.attributes.get(name))
            })
            .cloned()
    }

    fn event_info(partitions: &HashMap<String, Partition>, event: Event) -> Result<EventInfo> {
        let mut attributes = BTreeMap::new();
        let mut attribute_names = Vec::new();
        let mut required_context = Vec::new();

        for reference in &event.attributes {
            let Some(attribute) = Self::resolve_in(partitions, &reference.name, &event.catalog_id)
            else {
                return Err(CatalogError::UndefinedAttribute {
                    event: event.name.clone(),
                    catalog_id: event.catalog_id.clone(),
                    attribute: reference.name.clone(),
                });
            };
            if attribute.request_context {
                if attribute.required || reference.forces_required() {
                    required_context.push(context_key(&reference.name));
                }
            } else {
                attribute_names.push(normalize_key(&reference.name));
            }
            attributes.insert(reference.name.clone(), attribute);
        }

        Ok(EventInfo {
            event: Arc::new(event),
            attributes,
            attribute_names,
            required_context,
        })
    }

    fn catalog_or_default(catalog_id: Option<&str>) -> &str {
        catalog_id.unwrap_or(DEFAULT_CATALOG)
    }

    fn info(&self, event_name: &str, catalog_id: Option<&str>) -> Result<&EventInfo> {
        let catalog_id = Self::catalog_or_default(catalog_id);
        self.partitions
            .get(catalog_id)
            .and_then(|p| p.events.get(event_name))
            .or_else(|| {
                self.partitions
                    .get(DEFAULT_CATALOG)
                    .and_then(|p| p.events.get(event_name))
            })
            .ok_or_else(|| CatalogError::EventNotFound {
                event: event_name.to_string(),
                catalog_id: catalog_id.to_string(),
            })
    }

    /// Returns the maximum key length the index was built with.
    #[must_use]
    pub const fn max_key_length(&self) -> usize {
        self.options.max_key_length
    }

    /// Returns the registry the index was validated against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConstraintRegistry> {
        &self.options.registry
    }

    /// Returns the catalog ids, default first.
    #[must_use]
    pub fn catalog_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.partitions.keys().map(String::as_str).collect();
        ids.sort_by_key(|id| (*id != DEFAULT_CATALOG, *id));
        ids
    }

    /// Returns every event across all catalogs, ordered by catalog then name.
    #[must_use]
    pub fn events(&self) -> Vec<Arc<Event>> {
        let mut events: Vec<Arc<Event>> = self
            .partitions
            .values()
            .flat_map(|p| p.events.values().map(|i| Arc::clone(&i.event)))
            .collect();
        events.sort_by(|a, b| (&a.catalog_id, &a.name).cmp(&(&b.catalog_id, &b.name)));
        events
    }

    /// Returns the number of events across all catalogs.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.partitions.values().map(|p| p.events.len()).sum()
    }

    /// Returns the number of attributes across all catalogs.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.partitions.values().map(|p| p.attributes.len()).sum()
    }

    /// Returns the products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Returns the categories.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Resolves the events listed by a category. Names that do not resolve
    /// are skipped.
    #[must_use]
    pub fn events_in_category(&self, category: &str) -> Vec<Arc<Event>> {
        let Some(category) = self.categories.iter().find(|c| c.name == category) else {
            return Vec::new();
        };
        category
            .events
            .iter()
            .filter_map(|name| {
                let event = self.get_event(name, Some(&category.catalog_id));
                if event.is_none() {
                    debug!(category = %category.name, event = %name, "Category lists unknown event");
                }
                event
            })
            .collect()
    }
}

impl CatalogManager for CatalogIndex {
    fn get_event(&self, name: &str, catalog_id: Option<&str>) -> Option<Arc<Event>> {
        self.info(name, catalog_id).ok().map(|i| Arc::clone(&i.event))
    }

    fn get_attribute(&self, name: &str, catalog_id: Option<&str>) -> Option<Arc<Attribute>> {
        Self::resolve_in(&self.partitions, name, Self::catalog_or_default(catalog_id))
    }

    fn get_attributes(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
    ) -> Result<BTreeMap<String, Arc<Attribute>>> {
        let info = self.info(event_name, catalog_id)?;
        let mut attributes = BTreeMap::new();
        for reference in &info.event.attributes {
            match info.attributes.get(&reference.name) {
                Some(attribute) => {
                    attributes.insert(reference.name.clone(), Arc::clone(attribute));
                }
                None => warn!(
                    event = %event_name,
                    attribute = %reference.name,
                    "Unable to resolve event attribute"
                ),
            }
        }
        Ok(attributes)
    }

    fn get_attribute_names(&self, event_name: &str, catalog_id: Option<&str>) -> Result<Vec<String>> {
        Ok(self.info(event_name, catalog_id)?.attribute_names.clone())
    }

    fn get_required_context_attributes(
        &self,
        event_name: &str,
        catalog_id: Option<&str>,
    ) -> Result<Vec<String>> {
        Ok(self.info(event_name, catalog_id)?.required_context.clone())
    }

    fn get_request_context_attributes(&self) -> BTreeMap<String, Arc<Attribute>> {
        self.request_context.clone()
    }
}

/// Hot-reloadable handle to the current [`CatalogIndex`].
///
/// Clones share the same slot. [`reload`](Self::reload) builds the new index
/// completely before swapping it in; callers holding the previous snapshot
/// keep using it until they drop it.
#[derive(Debug, Clone)]
pub struct SharedCatalogManager {
    current: Arc<RwLock<Arc<CatalogIndex>>>,
}

impl SharedCatalogManager {
    /// Wraps an already built index.
    #[must_use]
    pub fn new(index: CatalogIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        Arc::clone(&self.current.read())
    }

    /// Builds a new index from `data` with the current options and publishes it.
    ///
    /// # Errors
    ///
    /// Returns the build error and keeps the current snapshot if `data` is invalid.
    pub fn reload(&self, data: CatalogData) -> Result<()> {
        let options = self.snapshot().options.clone();
        let index = options.build(data)?;
        self.replace(index);
        Ok(())
    }

    /// Publishes an already built index.
    pub fn replace(&self, index: CatalogIndex) {
        *self.current.write() = Arc::new(index);
        info!("Catalog snapshot replaced");
    }
}

impl CatalogSource for SharedCatalogManager {
    fn current(&self) -> Arc<dyn CatalogManager> {
        self.snapshot() as Arc<dyn CatalogManager>
    }
}
