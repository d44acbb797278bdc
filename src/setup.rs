// Copyright 2025 Cowboy AI, LLC.

//! Setup records
//!
//! A [`Setup`] is the stored record of parameter values associated with a
//! prior execution, distinct from the flow's declared schema: the flow
//! carries structure and defaults, the setup carries the values a run
//! actually used. Reconstruction rebuilds the flow's structure and overrides
//! it with the setup's values.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::composer::decompose;
use crate::errors::{FlowError, FlowResult};
use crate::flow::{parameter_values_to_json, Flow};
use crate::instance::AlgorithmInstance;
use crate::registry::AlgorithmRegistry;
use crate::schema::OptionKind;

/// One recorded parameter value, addressed by component flow name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SetupParameter {
    /// Flow name of the component the value belongs to
    pub flow_name: String,
    /// Option, flag, or slot code within that component
    pub name: String,
    /// Recorded value; slot codes hold the JSON-array-encoded spec list
    pub value: String,
}

/// Recorded parameter values of one execution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Setup {
    /// Recorded values, one per parameter per component
    pub parameters: Vec<SetupParameter>,
}

impl Setup {
    /// Values recorded for a given component flow name
    pub fn values_for<'a>(
        &'a self,
        flow_name: &'a str,
    ) -> impl Iterator<Item = &'a SetupParameter> + 'a {
        self.parameters.iter().filter(move |p| p.flow_name == flow_name)
    }
}

/// Capture the current parameter values of an instance tree
///
/// Every node contributes one entry per schema option and one per bound
/// slot, addressed by the node's composite flow name.
pub fn setup_from_instance(instance: &AlgorithmInstance) -> Setup {
    let mut setup = Setup::default();
    capture_node(instance, &mut setup);
    setup
}

fn capture_node(instance: &AlgorithmInstance, setup: &mut Setup) {
    let flow_name = instance.flow_name();
    let schema = instance.schema();

    for option in &schema.options {
        let value = match option.kind {
            OptionKind::Scalar { .. } => instance
                .option_value(&option.code)
                .unwrap_or_default()
                .to_string(),
            OptionKind::Flag => instance.flag_enabled(&option.code).to_string(),
        };
        setup.parameters.push(SetupParameter {
            flow_name: flow_name.clone(),
            name: option.code.clone(),
            value,
        });
    }

    for slot in &schema.slots {
        let Some(value) = instance.slot(&slot.code) else {
            continue;
        };
        let specs: Vec<String> = value
            .children()
            .map(|child| {
                let options = child.options();
                if options.is_empty() {
                    child.class_id().to_string()
                } else {
                    format!(
                        "{} {}",
                        child.class_id(),
                        crate::options::join_options(&options)
                    )
                }
            })
            .collect();
        setup.parameters.push(SetupParameter {
            flow_name: flow_name.clone(),
            name: slot.code.clone(),
            value: parameter_values_to_json(&specs),
        });

        for child in value.children() {
            capture_node(child, setup);
        }
    }
}

/// Reconstruct an instance from a flow's structure and a setup's values
///
/// The flow fixes the tree shape and defaults; the setup overrides scalar
/// and flag values per component. Slot-valued setup entries are validated
/// against the flow structure: the recorded class must match the bound
/// sub-instance.
///
/// # Errors
///
/// Propagates decomposition errors, rejects malformed values, and returns
/// [`FlowError::OptionMismatch`] when a slot-valued entry names a different
/// class than the flow binds, or when an entry references no component of
/// the flow.
#[instrument(skip_all, fields(name = %flow.name))]
pub fn instance_from_setup(
    registry: &AlgorithmRegistry,
    setup: &Setup,
    flow: &Flow,
) -> FlowResult<AlgorithmInstance> {
    let mut instance = decompose(registry, flow)?;

    let mut consumed: BTreeSet<usize> = BTreeSet::new();
    apply_node(&mut instance, setup, &mut consumed)?;

    let stray = setup
        .parameters
        .iter()
        .enumerate()
        .find_map(|(i, p)| (!consumed.contains(&i)).then_some(p));
    if let Some(stray) = stray {
        return Err(FlowError::malformed(
            &stray.name,
            format!("setup references no component named '{}'", stray.flow_name),
        ));
    }

    debug!(
        parameters = setup.parameters.len(),
        "applied setup onto flow structure"
    );
    Ok(instance)
}

fn apply_node(
    instance: &mut AlgorithmInstance,
    setup: &Setup,
    consumed: &mut BTreeSet<usize>,
) -> FlowResult<()> {
    let flow_name = instance.flow_name();
    let schema = instance.schema().clone();
    let class_id = schema.class_id.clone();

    for (index, entry) in setup.parameters.iter().enumerate() {
        if entry.flow_name != flow_name {
            continue;
        }
        consumed.insert(index);

        if let Some(option) = schema.option(&entry.name) {
            match option.kind {
                OptionKind::Scalar { .. } => instance.set_option(&entry.name, entry.value.clone())?,
                OptionKind::Flag => {
                    let enabled = match entry.value.as_str() {
                        "true" => true,
                        "false" => false,
                        other => {
                            return Err(FlowError::malformed(
                                &entry.name,
                                format!("flag value must be true or false, got '{other}'"),
                            ))
                        }
                    };
                    instance.set_flag(&entry.name, enabled)?;
                }
            }
            continue;
        }

        if schema.slot(&entry.name).is_some() {
            let specs: Vec<String> = serde_json::from_str(&entry.value).map_err(|e| {
                FlowError::malformed(&entry.name, format!("not a JSON string array: {e}"))
            })?;
            let bound: Vec<String> = instance
                .slot(&entry.name)
                .map(|v| v.children().map(|c| c.class_id().to_string()).collect())
                .unwrap_or_default();
            if specs.len() != bound.len() {
                return Err(FlowError::OptionMismatch {
                    class_id: class_id.clone(),
                    token: entry.name.clone(),
                });
            }
            for (spec, bound_class) in specs.iter().zip(&bound) {
                let recorded_class = spec.split_whitespace().next().unwrap_or_default();
                if recorded_class != bound_class {
                    return Err(FlowError::OptionMismatch {
                        class_id: class_id.clone(),
                        token: format!("{}={recorded_class}", entry.name),
                    });
                }
            }
            continue;
        }

        return Err(FlowError::OptionMismatch {
            class_id: class_id.clone(),
            token: entry.name.clone(),
        });
    }

    let slot_codes: Vec<String> = schema.slots.iter().map(|s| s.code.clone()).collect();
    for code in slot_codes {
        for child in instance.slot_children_mut(&code) {
            apply_node(child, setup, consumed)?;
        }
    }

    Ok(())
}
