// Copyright 2025 Cowboy AI, LLC.

//! Flow composition and decomposition
//!
//! [`compose`] derives a fresh [`Flow`] descriptor from an algorithm instance
//! tree, bottom-up; [`decompose`] reconstructs an instance tree from a
//! descriptor through the registry. Both are pure, synchronous, fail-fast
//! transformations: no I/O, no randomness, no partial results.

use tracing::{debug, instrument, warn};

use crate::errors::{FlowError, FlowResult};
use crate::flow::{
    parameter_values_to_json, Component, Flow, Parameter, DATA_TYPE_COMPONENT, DATA_TYPE_FLAG,
    DATA_TYPE_OPTION,
};
use crate::instance::{instantiate_from_spec, AlgorithmInstance};
use crate::options::join_options;
use crate::registry::AlgorithmRegistry;
use crate::schema::{OptionKind, SlotArity};

/// Version marker stamped into composed descriptors
fn external_version() -> String {
    format!("{}_{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Render the `"<class id> <options>"` spec embedded in composite defaults
///
/// Built from the sub-instance's own option accessor. For a sub-instance
/// bound under a quoted slot this is one level deeper than what the parent's
/// token stream embeds: the parent renders composite grandchildren as bare
/// class ids. The two encodings disagree for configured grandchildren; that
/// asymmetry is inherited surface behavior and [`compose`] warns when it is
/// reachable rather than correcting it.
fn default_value_spec(child: &AlgorithmInstance) -> String {
    let options = child.options();
    if options.is_empty() {
        child.class_id().to_string()
    } else {
        format!("{} {}", child.class_id(), join_options(&options))
    }
}

/// Compose a flow descriptor from an algorithm instance tree
///
/// The descriptor's name is the class identifier for a leaf and
/// `ClassId(child1[,child2...])` for a container, children in declared slot
/// order. Every schema option becomes a parameter; every bound slot becomes a
/// composite parameter (JSON-array-encoded spec list) plus one nested
/// component per sub-instance.
#[instrument(skip_all, fields(class_id = instance.class_id()))]
pub fn compose(instance: &AlgorithmInstance, tags: &[String]) -> FlowResult<Flow> {
    if instance.has_shallow_encoded_descendants() {
        warn!(
            class_id = instance.class_id(),
            "quoted slot binds a composite sub-instance; its nested configuration \
             will not survive token rendering"
        );
    }
    let flow = compose_node(instance, tags)?;
    debug!(name = %flow.name, components = crate::flow::count_flow_components(&flow), "composed flow");
    Ok(flow)
}

fn compose_node(instance: &AlgorithmInstance, tags: &[String]) -> FlowResult<Flow> {
    let schema = instance.schema();

    let mut parameters = Vec::new();
    for option in &schema.options {
        let (data_type, default_value) = match &option.kind {
            OptionKind::Scalar { .. } => (
                DATA_TYPE_OPTION,
                instance
                    .option_value(&option.code)
                    .unwrap_or_default()
                    .to_string(),
            ),
            OptionKind::Flag => (
                DATA_TYPE_FLAG,
                instance.flag_enabled(&option.code).to_string(),
            ),
        };
        parameters.push(Parameter {
            name: option.code.clone(),
            data_type: data_type.to_string(),
            default_value,
            description: option.description.clone(),
        });
    }

    let mut components = Vec::new();
    let mut child_names = Vec::new();
    for slot in &schema.slots {
        let Some(value) = instance.slot(&slot.code) else {
            continue;
        };

        let mut specs = Vec::new();
        for (index, child) in value.children().enumerate() {
            let child_flow = compose_node(child, tags)?;
            child_names.push(child_flow.name.clone());
            specs.push(default_value_spec(child));
            let identifier = match slot.arity {
                SlotArity::Single { .. } => slot.code.clone(),
                SlotArity::List => format!("{}{}", slot.code, index),
            };
            components.push(Component {
                identifier,
                flow: child_flow,
            });
        }

        parameters.push(Parameter {
            name: slot.code.clone(),
            data_type: DATA_TYPE_COMPONENT.to_string(),
            default_value: parameter_values_to_json(&specs),
            description: slot.description.clone(),
        });
    }

    let name = if child_names.is_empty() {
        schema.class_id.clone()
    } else {
        format!("{}({})", schema.class_id, child_names.join(","))
    };

    Ok(Flow {
        name,
        class_id: schema.class_id.clone(),
        external_version: external_version(),
        description: schema.description.clone(),
        tags: tags.to_vec(),
        parameters,
        components,
    })
}

/// Extract the root class identifier from a composite flow name
fn root_class_id(name: &str) -> &str {
    match name.split_once('(') {
        Some((class_id, _)) => class_id,
        None => name,
    }
}

/// Reconstruct an algorithm instance tree from a flow descriptor
///
/// The root class comes from the name prefix; parameters drive the rest.
/// Composite parameters are parsed bottom-up: JSON array, leading class
/// token, recursive instantiation, slot binding.
///
/// # Errors
///
/// Returns [`FlowError::UnknownAlgorithmClass`] when a class identifier has
/// no registered schema and [`FlowError::MalformedParameterEncoding`] when a
/// composite default value is not valid JSON or lacks the expected
/// `"<class> <options>"` shape.
#[instrument(skip_all, fields(name = %flow.name))]
pub fn decompose(registry: &AlgorithmRegistry, flow: &Flow) -> FlowResult<AlgorithmInstance> {
    let class_id = root_class_id(&flow.name);
    if !flow.class_id.is_empty() && flow.class_id != class_id {
        return Err(FlowError::malformed(
            "name",
            format!(
                "name prefix '{}' does not match class id '{}'",
                class_id, flow.class_id
            ),
        ));
    }

    let mut instance = registry.instantiate(class_id)?;
    let schema = instance.schema().clone();

    for parameter in &flow.parameters {
        if let Some(option) = schema.option(&parameter.name) {
            match option.kind {
                OptionKind::Scalar { .. } => {
                    instance.set_option(&parameter.name, parameter.default_value.clone())?;
                }
                OptionKind::Flag => {
                    let enabled = match parameter.default_value.as_str() {
                        "true" => true,
                        "false" => false,
                        other => {
                            return Err(FlowError::malformed(
                                &parameter.name,
                                format!("flag value must be true or false, got '{other}'"),
                            ))
                        }
                    };
                    instance.set_flag(&parameter.name, enabled)?;
                }
            }
            continue;
        }

        let Some(slot) = schema.slot(&parameter.name) else {
            return Err(FlowError::OptionMismatch {
                class_id: class_id.to_string(),
                token: parameter.name.clone(),
            });
        };

        let specs: Vec<String> =
            serde_json::from_str(&parameter.default_value).map_err(|e| {
                FlowError::malformed(&parameter.name, format!("not a JSON string array: {e}"))
            })?;

        match slot.arity {
            SlotArity::Single { .. } => {
                let [spec] = specs.as_slice() else {
                    return Err(FlowError::malformed(
                        &parameter.name,
                        format!("expected exactly one spec, got {}", specs.len()),
                    ));
                };
                let child = instantiate_from_spec(registry, &parameter.name, spec)?;
                instance.set_slot(&parameter.name, child)?;
            }
            SlotArity::List => {
                let mut children = Vec::with_capacity(specs.len());
                for spec in &specs {
                    children.push(instantiate_from_spec(registry, &parameter.name, spec)?);
                }
                instance.set_slot_children(&parameter.name, children)?;
            }
        }
    }

    debug!(class_id, "decomposed flow");
    Ok(instance)
}
