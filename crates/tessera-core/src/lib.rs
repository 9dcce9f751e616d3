//! # Tessera Core
//!
//! Catalog model and lookup for structured audit events.
//!
//! This crate provides:
//!
//! - [`CatalogData`] and friends - the declarative definition of events,
//!   attributes and their constraints
//! - [`ConstraintRegistry`] - evaluators for constraint types such as
//!   `pattern`, `enum` or `maxValue`
//! - [`CatalogIndex`] - an immutable, indexed snapshot implementing
//!   [`CatalogManager`], with fallback to the default catalog
//! - [`SharedCatalogManager`] - a hot-reloadable handle to the current snapshot
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Attribute, CatalogData, CatalogIndex, CatalogManager, Event};
//!
//! let data = CatalogData::new()
//!     .with_attribute(Attribute::new("amount").required(true).constraint("minValue", "0"))
//!     .with_event(Event::new("deposit").attribute("amount"));
//!
//! let index = CatalogIndex::build(data)?;
//! assert_eq!(index.get_attribute_names("deposit", None)?, vec!["amount"]);
//! # Ok::<(), tessera_core::CatalogError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod constraint;
pub mod error;
pub mod fixtures;
pub mod manager;
pub mod model;
pub mod plugins;
mod reader;
pub mod validation;

#[cfg(test)]
mod proptest_tests;

pub use constraint::{ConstraintRegistry, ConstraintType};
pub use error::{CatalogError, Result};
pub use manager::{
    normalize_key, CatalogIndex, CatalogManager, CatalogSource, IndexBuilder,
    SharedCatalogManager, DEFAULT_MAX_KEY_LENGTH, REQUEST_CONTEXT_PREFIX,
};
pub use model::{
    Attribute, CatalogData, Category, Constraint, ConstraintTypeRef, DataType, Event,
    EventAttribute, Product, COMPLETION_STATUS, DEFAULT_CATALOG,
};
pub use validation::{is_blank, ValidationErrors};
