// Copyright 2025 Cowboy AI, LLC.

//! Algorithm registry
//!
//! The registry is the startup lookup table from class identifiers to
//! [`AlgorithmSchema`] records. It is the only way to construct
//! [`AlgorithmInstance`] values: `instantiate` builds a default-configured
//! instance, recursively constructing default sub-instances for single slots.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog;
use crate::errors::{FlowError, FlowResult};
use crate::instance::AlgorithmInstance;
use crate::schema::{AlgorithmSchema, SlotArity};

/// Lookup table of registered algorithm schemas
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    schemas: BTreeMap<String, Arc<AlgorithmSchema>>,
}

impl AlgorithmRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the builtin catalog
    pub fn with_catalog() -> Self {
        let mut registry = Self::new();
        for schema in catalog::builtin_schemas() {
            registry
                .register(schema)
                .expect("builtin catalog must be valid");
        }
        registry
    }

    /// Register a schema
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidSchema`] when the schema fails validation
    /// and [`FlowError::DuplicateAlgorithmClass`] when the class identifier is
    /// already registered.
    pub fn register(&mut self, schema: AlgorithmSchema) -> FlowResult<()> {
        schema.validate()?;
        if self.schemas.contains_key(&schema.class_id) {
            return Err(FlowError::DuplicateAlgorithmClass(schema.class_id));
        }
        self.schemas.insert(schema.class_id.clone(), Arc::new(schema));
        Ok(())
    }

    /// True when a class identifier is registered
    pub fn contains(&self, class_id: &str) -> bool {
        self.schemas.contains_key(class_id)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when no class is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterate over registered class identifiers in sorted order
    pub fn class_ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Look up a schema by class identifier
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownAlgorithmClass`] when unregistered.
    pub fn schema(&self, class_id: &str) -> FlowResult<&AlgorithmSchema> {
        self.schemas
            .get(class_id)
            .map(|schema| schema.as_ref())
            .ok_or_else(|| FlowError::UnknownAlgorithmClass {
                class_id: class_id.to_string(),
            })
    }

    /// Construct a default instance of a registered class
    ///
    /// Scalar options take their declared defaults, flags start disabled,
    /// list slots start empty, and each single slot is bound to a default
    /// instance of its declared class, recursively.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownAlgorithmClass`] for unregistered classes
    /// (including default sub-instance classes) and
    /// [`FlowError::InvalidSchema`] when default sub-instances form a cycle.
    pub fn instantiate(&self, class_id: &str) -> FlowResult<AlgorithmInstance> {
        let mut stack = Vec::new();
        self.instantiate_inner(class_id, &mut stack)
    }

    fn instantiate_inner(
        &self,
        class_id: &str,
        stack: &mut Vec<String>,
    ) -> FlowResult<AlgorithmInstance> {
        if stack.iter().any(|c| c == class_id) {
            return Err(FlowError::InvalidSchema {
                class_id: class_id.to_string(),
                reason: format!("default sub-instance cycle through {}", stack.join(" -> ")),
            });
        }

        let schema = self
            .schemas
            .get(class_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownAlgorithmClass {
                class_id: class_id.to_string(),
            })?;

        let mut instance = AlgorithmInstance::from_schema(schema.clone());

        stack.push(class_id.to_string());
        for slot in &schema.slots {
            if let SlotArity::Single { default_class } = &slot.arity {
                let child = self.instantiate_inner(default_class, stack)?;
                instance.bind_default_child(&slot.code, child);
            }
        }
        stack.pop();

        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Category, OptionSpec, SlotSpec};

    /// Test registration rejects duplicates
    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = AlgorithmRegistry::new();
        let schema = AlgorithmSchema::new("learn.test.Once", Category::Learner, "test");
        registry.register(schema.clone()).unwrap();

        let err = registry.register(schema).unwrap_err();
        assert!(matches!(err, FlowError::DuplicateAlgorithmClass(_)));
    }

    /// Test registration validates schemas
    #[test]
    fn test_register_validates() {
        let mut registry = AlgorithmRegistry::new();
        let schema = AlgorithmSchema::new("learn.test(bad)", Category::Learner, "test");
        let err = registry.register(schema).unwrap_err();
        assert!(matches!(err, FlowError::InvalidSchema { .. }));
        assert!(registry.is_empty());
    }

    /// Test unknown class lookup fails
    #[test]
    fn test_unknown_class() {
        let registry = AlgorithmRegistry::new();
        let err = registry.schema("learn.test.Missing").unwrap_err();
        assert!(matches!(err, FlowError::UnknownAlgorithmClass { .. }));

        let err = registry.instantiate("learn.test.Missing").unwrap_err();
        assert!(matches!(err, FlowError::UnknownAlgorithmClass { .. }));
    }

    /// Test instantiate fills scalar defaults and default sub-instances
    ///
    /// ```mermaid
    /// graph TD
    ///     A[instantiate Bagging] --> B[scalar defaults]
    ///     A --> C[instantiate RepTree]
    ///     C --> D[bound to slot W]
    /// ```
    #[test]
    fn test_instantiate_defaults() {
        let registry = AlgorithmRegistry::with_catalog();
        let bagging = registry.instantiate("learn.meta.Bagging").unwrap();

        assert_eq!(bagging.option_value("P"), Some("100"));
        assert_eq!(bagging.option_value("I"), Some("10"));

        let child = bagging.slot_child("W").expect("default W sub-instance");
        assert_eq!(child.class_id(), "learn.tree.RepTree");
        assert_eq!(child.option_value("M"), Some("2"));
    }

    /// Test default sub-instance cycles are reported, not overflowed
    #[test]
    fn test_default_cycle_detected() {
        let mut registry = AlgorithmRegistry::new();
        registry
            .register(
                AlgorithmSchema::new("learn.test.SelfWrap", Category::Learner, "loops")
                    .with_slot(SlotSpec::trailing(
                        "W",
                        "wrapped learner",
                        Category::Learner,
                        "learn.test.SelfWrap",
                    )),
            )
            .unwrap();

        let err = registry.instantiate("learn.test.SelfWrap").unwrap_err();
        match err {
            FlowError::InvalidSchema { reason, .. } => assert!(reason.contains("cycle")),
            other => panic!("Expected InvalidSchema, got {other}"),
        }
    }

    /// Test a missing default sub-instance class is surfaced
    #[test]
    fn test_missing_default_class() {
        let mut registry = AlgorithmRegistry::new();
        registry
            .register(
                AlgorithmSchema::new("learn.test.Orphan", Category::Learner, "dangling default")
                    .with_option(OptionSpec::scalar("I", "iterations", "10"))
                    .with_slot(SlotSpec::trailing(
                        "W",
                        "wrapped learner",
                        Category::Learner,
                        "learn.test.Nowhere",
                    )),
            )
            .unwrap();

        let err = registry.instantiate("learn.test.Orphan").unwrap_err();
        assert!(matches!(err, FlowError::UnknownAlgorithmClass { .. }));
    }

    /// Test the builtin catalog loads and is well-formed
    #[test]
    fn test_catalog_loads() {
        let registry = AlgorithmRegistry::with_catalog();
        assert!(!registry.is_empty());
        assert!(registry.contains("learn.rule.ZeroRule"));
        assert!(registry.contains("learn.meta.Bagging"));
        assert!(registry.contains("kernel.Rbf"));
        assert!(registry.contains("filter.Multi"));

        // every registered class must instantiate cleanly
        let ids: Vec<String> = registry.class_ids().map(str::to_string).collect();
        for id in ids {
            registry.instantiate(&id).unwrap();
        }
    }
}
