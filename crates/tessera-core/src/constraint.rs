//! Constraint registry.
//!
//! Maps constraint type names to evaluators. A registry is built once, at
//! startup, and only read afterwards; lookups take `&self` and need no
//! locking. Names are matched case-insensitively.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::plugins;
use crate::validation::ValidationErrors;

/// An evaluator for one kind of constraint.
///
/// Implementations append a message to `errors` for every violation and
/// never fail in any other way. A blank `value` always passes; requiredness
/// is checked elsewhere.
pub trait ConstraintType: Send + Sync + Debug {
    /// Name the type is registered under, e.g. `pattern`.
    fn name(&self) -> &str;

    /// Checks `value` of field `name` against `parameter`.
    fn validate(
        &self,
        is_request_context: bool,
        name: &str,
        value: &str,
        parameter: &str,
        errors: &mut ValidationErrors,
    );
}

/// Lookup table of constraint evaluators.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    types: HashMap<String, Arc<dyn ConstraintType>>,
}

static BUILTIN: Lazy<Arc<ConstraintRegistry>> = Lazy::new(|| Arc::new(ConstraintRegistry::builtin()));

impl ConstraintRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in constraint type.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for constraint_type in plugins::builtin_types() {
            registry.register(constraint_type);
        }
        registry
    }

    /// Returns the shared registry of built-in types, created on first use.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Registers an evaluator, replacing any type with the same name.
    pub fn register(&mut self, constraint_type: Arc<dyn ConstraintType>) -> &mut Self {
        self.types
            .insert(constraint_type.name().to_lowercase(), constraint_type);
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, constraint_type: Arc<dyn ConstraintType>) -> Self {
        self.register(constraint_type);
        self
    }

    /// Finds an evaluator by name, ignoring case.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn ConstraintType>> {
        self.types.get(&name.to_lowercase())
    }

    /// Returns true if an evaluator is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.values().map(|t| t.name()).collect();
        names.sort_unstable();
        names
    }

    /// Evaluates one constraint, recording an error if the type is unknown.
    pub fn evaluate(
        &self,
        is_request_context: bool,
        constraint_type: &str,
        name: &str,
        value: &str,
        parameter: &str,
        errors: &mut ValidationErrors,
    ) {
        let Some(evaluator) = self.lookup(constraint_type) else {
            warn!(constraint_type, key = name, "Unknown constraint type");
            let target = if is_request_context {
                "ThreadContext key"
            } else {
                "key"
            };
            errors.push(format!(
                "Unable to locate constraint type {constraint_type} for {target} {name}"
            ));
            return;
        };
        evaluator.validate(is_request_context, name, value, parameter, errors);
    }
}
