// Copyright 2025 Cowboy AI, LLC.

//! Flow descriptors
//!
//! A [`Flow`] is the named, versioned description of an algorithm
//! configuration tree: an ordered set of uniquely-named parameters plus one
//! nested component flow per bound sub-instance. Descriptors are derived
//! fresh on every composition and never mutated in place.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::FlowResult;

/// Data type label for scalar option parameters
pub const DATA_TYPE_OPTION: &str = "option";
/// Data type label for boolean flag parameters
pub const DATA_TYPE_FLAG: &str = "flag";
/// Data type label for composite slot parameters
pub const DATA_TYPE_COMPONENT: &str = "component";

/// A single declared parameter of a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    /// Parameter name: the option or slot code it was derived from
    pub name: String,
    /// One of [`DATA_TYPE_OPTION`], [`DATA_TYPE_FLAG`], [`DATA_TYPE_COMPONENT`]
    pub data_type: String,
    /// Default value; composite parameters hold a JSON-array-encoded spec list
    pub default_value: String,
    /// Human-readable description from the schema
    pub description: String,
}

/// A nested sub-flow bound to a composite slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Component {
    /// Slot code; list slots suffix the element index (`F0`, `F1`, ...)
    pub identifier: String,
    /// Descriptor of the bound sub-instance
    pub flow: Flow,
}

/// A named, versioned descriptor of an algorithm configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Flow {
    /// Composite name: `ClassId(child1[,child2...])`, recursively
    pub name: String,
    /// Class identifier of the root algorithm
    pub class_id: String,
    /// Version marker of the producing library
    pub external_version: String,
    /// What the root algorithm does
    pub description: String,
    /// Free-form tags attached on composition
    pub tags: Vec<String>,
    /// Declared parameters, uniquely named, in schema order
    pub parameters: Vec<Parameter>,
    /// Nested component flows, in slot order
    pub components: Vec<Component>,
}

impl Flow {
    /// Index the parameters by name
    ///
    /// Parameter names are unique within a flow, so the map is lossless.
    pub fn parameters_by_name(&self) -> BTreeMap<&str, &Parameter> {
        self.parameters.iter().map(|p| (p.name.as_str(), p)).collect()
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Look up a component by identifier
    pub fn component(&self, identifier: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.identifier == identifier)
    }

    /// Deterministic textual form of the descriptor
    ///
    /// Two flows are the same descriptor exactly when their canonical texts
    /// are byte-identical; the round-trip laws are stated over this form.
    pub fn canonical_text(&self) -> FlowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Encode parameter values as the JSON array used for composite defaults
///
/// A single-valued slot contributes a one-element array; list slots one
/// element per bound sub-instance.
pub fn parameter_values_to_json(values: &[String]) -> String {
    serde_json::to_string(values).expect("string slices always serialize")
}

/// Number of flows in a descriptor tree, the root included
pub fn count_flow_components(flow: &Flow) -> usize {
    1 + flow
        .components
        .iter()
        .map(|c| count_flow_components(&c.flow))
        .sum::<usize>()
}
