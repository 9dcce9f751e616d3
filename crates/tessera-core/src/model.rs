//! Catalog model: products, categories, events and attributes.
//!
//! All types are plain immutable data once loaded. Field names serialize in
//! camelCase so catalog documents written for other tooling load unchanged.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Id of the catalog that acts as fallback for every lookup.
pub const DEFAULT_CATALOG: &str = "DEFAULT";

/// Attribute key that every event accepts without declaring it.
pub const COMPLETION_STATUS: &str = "completionStatus";

fn default_catalog_id() -> String {
    DEFAULT_CATALOG.to_string()
}

fn is_default_catalog(catalog_id: &str) -> bool {
    catalog_id == DEFAULT_CATALOG
}

/// Data type tag carried by an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Free text.
    #[default]
    String,
    /// Arbitrary precision decimal.
    BigDecimal,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// Boolean flag.
    Boolean,
    /// List of strings.
    List,
    /// String to string map.
    Map,
}

impl DataType {
    /// All data types in declaration order.
    pub const ALL: [Self; 9] = [
        Self::String,
        Self::BigDecimal,
        Self::Double,
        Self::Float,
        Self::Int,
        Self::Long,
        Self::Boolean,
        Self::List,
        Self::Map,
    ];

    /// Returns the display name of the type.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::BigDecimal => "BigDecimal",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::List => "List<String>",
            Self::Map => "Map<String, String>",
        }
    }

    /// Looks a type up by its display name, ignoring case.
    ///
    /// ```
    /// use tessera_core::DataType;
    ///
    /// assert_eq!(DataType::from_name("bigdecimal"), Some(DataType::BigDecimal));
    /// assert_eq!(DataType::from_name("uuid"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.type_name().eq_ignore_ascii_case(name))
    }
}

/// Reference to a constraint type by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintTypeRef {
    /// Registered constraint type name, e.g. `pattern` or `maxLength`.
    pub name: String,
}

/// A constraint type name paired with its parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Constraint type.
    pub constraint_type: ConstraintTypeRef,
    /// Parameter handed to the evaluator (regex, bound, enum list, ...).
    #[serde(default)]
    pub value: String,
}

impl Constraint {
    /// Creates a constraint of the given type.
    #[must_use]
    pub fn new(type_name: &str, value: &str) -> Self {
        Self {
            constraint_type: ConstraintTypeRef {
                name: type_name.to_string(),
            },
            value: value.to_string(),
        }
    }

    /// Returns the constraint type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.constraint_type.name
    }
}

/// A named field definition shared by events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Unique name within its catalog.
    pub name: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Data type tag.
    #[serde(default)]
    pub data_type: DataType,
    /// Whether the attribute is indexed by downstream stores.
    #[serde(default)]
    pub indexed: bool,
    /// Whether the attribute is sortable by downstream stores.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the attribute must be present.
    #[serde(default)]
    pub required: bool,
    /// Whether the value comes from the request context instead of the caller.
    #[serde(default)]
    pub request_context: bool,
    /// Example values.
    #[serde(default)]
    pub examples: BTreeSet<String>,
    /// Alternate names.
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    /// Constraints, evaluated in this order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Owning catalog.
    #[serde(default = "default_catalog_id", skip_serializing_if = "is_default_catalog")]
    pub catalog_id: String,
}

impl Attribute {
    /// Creates an optional string attribute in the default catalog.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            data_type: DataType::String,
            indexed: false,
            sortable: false,
            required: false,
            request_context: false,
            examples: BTreeSet::new(),
            aliases: BTreeSet::new(),
            constraints: Vec::new(),
            catalog_id: default_catalog_id(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the data type.
    #[must_use]
    pub const fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Sets the indexed and sortable flags.
    #[must_use]
    pub const fn indexed(mut self, indexed: bool, sortable: bool) -> Self {
        self.indexed = indexed;
        self.sortable = sortable;
        self
    }

    /// Sets the required flag.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Marks the attribute as sourced from the request context.
    #[must_use]
    pub const fn request_context(mut self, request_context: bool) -> Self {
        self.request_context = request_context;
        self
    }

    /// Adds an example value.
    #[must_use]
    pub fn example(mut self, example: &str) -> Self {
        self.examples.insert(example.to_string());
        self
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.insert(alias.to_string());
        self
    }

    /// Attaches a constraint.
    #[must_use]
    pub fn constraint(mut self, type_name: &str, value: &str) -> Self {
        self.constraints.push(Constraint::new(type_name, value));
        self
    }

    /// Moves the attribute into the given catalog.
    #[must_use]
    pub fn in_catalog(mut self, catalog_id: &str) -> Self {
        self.catalog_id = catalog_id.to_string();
        self
    }
}

/// Reference from an event to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    /// Attribute name.
    pub name: String,
    /// Event-level requiredness. `Some(true)` forces the attribute to be
    /// required for this event; it never relaxes an attribute-level flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl EventAttribute {
    /// Creates a reference without an override.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: None,
        }
    }

    /// Creates a reference with an explicit override.
    #[must_use]
    pub fn with_required(name: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            required: Some(required),
        }
    }

    /// Returns true only if the override is explicitly `true`.
    #[must_use]
    pub const fn forces_required(&self) -> bool {
        matches!(self.required, Some(true))
    }
}

/// A structured record type that may be audit-logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Alternate names.
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    /// Owning catalog.
    #[serde(default = "default_catalog_id", skip_serializing_if = "is_default_catalog")]
    pub catalog_id: String,
    /// Declared attributes in order.
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    /// Creates an event with no attributes in the default catalog.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            aliases: BTreeSet::new(),
            catalog_id: default_catalog_id(),
            attributes: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Declares an attribute without an override.
    #[must_use]
    pub fn attribute(mut self, name: &str) -> Self {
        self.attributes.push(EventAttribute::new(name));
        self
    }

    /// Declares an attribute with an explicit required override.
    #[must_use]
    pub fn attribute_required(mut self, name: &str, required: bool) -> Self {
        self.attributes
            .push(EventAttribute::with_required(name, required));
        self
    }

    /// Moves the event into the given catalog.
    #[must_use]
    pub fn in_catalog(mut self, catalog_id: &str) -> Self {
        self.catalog_id = catalog_id.to_string();
        self
    }
}

/// A product grouping events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product name.
    pub name: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Owning catalog.
    #[serde(default = "default_catalog_id", skip_serializing_if = "is_default_catalog")]
    pub catalog_id: String,
    /// Names of the events that belong to the product.
    #[serde(default)]
    pub events: Vec<String>,
}

impl Product {
    /// Creates an empty product.
    #[must_use]
    pub fn new(name: &str, display_name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            catalog_id: default_catalog_id(),
            events: Vec::new(),
        }
    }

    /// Adds an event name.
    #[must_use]
    pub fn event(mut self, event: &str) -> Self {
        self.events.push(event.to_string());
        self
    }
}

/// A category grouping events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category name.
    pub name: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Owning catalog.
    #[serde(default = "default_catalog_id", skip_serializing_if = "is_default_catalog")]
    pub catalog_id: String,
    /// Names of the events in the category.
    #[serde(default)]
    pub events: Vec<String>,
}

impl Category {
    /// Creates an empty category.
    #[must_use]
    pub fn new(name: &str, display_name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            catalog_id: default_catalog_id(),
            events: Vec::new(),
        }
    }

    /// Adds an event name.
    #[must_use]
    pub fn event(mut self, event: &str) -> Self {
        self.events.push(event.to_string());
        self
    }
}

/// Complete catalog document: every product, category, event and attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    /// Products.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Categories.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Events.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl CatalogData {
    /// Creates an empty catalog document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds an event.
    #[must_use]
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Adds a product.
    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Adds a category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::BigDecimal.type_name(), "BigDecimal");
        assert_eq!(DataType::from_name("INT"), Some(DataType::Int));
        assert_eq!(DataType::from_name("list<string>"), Some(DataType::List));
    }

    #[test]
    fn test_event_attribute_override() {
        assert!(EventAttribute::with_required("a", true).forces_required());
        assert!(!EventAttribute::with_required("a", false).forces_required());
        assert!(!EventAttribute::new("a").forces_required());
    }

    #[test]
    fn test_attribute_builder() {
        let attr = Attribute::new("ipAddress")
            .display_name("IP Address")
            .data_type(DataType::String)
            .indexed(true, true)
            .request_context(true)
            .constraint("pattern", "^[0-9.]+$")
            .constraint("maxLength", "15");

        assert!(attr.request_context);
        assert!(!attr.required);
        assert_eq!(attr.constraints.len(), 2);
        assert_eq!(attr.constraints[1].type_name(), "maxLength");
        assert_eq!(attr.catalog_id, DEFAULT_CATALOG);
    }

    #[test]
    fn test_attribute_json_shape() {
        let json = r#"{
            "name": "amount",
            "dataType": "BIG_DECIMAL",
            "required": true,
            "requestContext": false,
            "constraints": [{"constraintType": {"name": "minValue"}, "value": "0"}]
        }"#;
        let attr: Attribute = serde_json::from_str(json).unwrap();

        assert_eq!(attr.data_type, DataType::BigDecimal);
        assert!(attr.required);
        assert_eq!(attr.catalog_id, DEFAULT_CATALOG);
        assert_eq!(attr.constraints[0], Constraint::new("minValue", "0"));

        let out = serde_json::to_string(&attr).unwrap();
        assert!(out.contains("\"requestContext\":false"));
        assert!(!out.contains("catalogId"));
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"name": "transfer", "catalogId": "retail",
            "attributes": [{"name": "toAccount", "required": true}, {"name": "memo"}]}"#;
        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(event.catalog_id, "retail");
        assert_eq!(event.attributes[0].required, Some(true));
        assert_eq!(event.attributes[1].required, None);
    }
}
