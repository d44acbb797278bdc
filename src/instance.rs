// Copyright 2025 Cowboy AI, LLC.

//! Algorithm instance trees
//!
//! An [`AlgorithmInstance`] is an explicit tree node owning its sub-instances
//! by value. There are no parent back-references: composition is strictly
//! tree-shaped, so rendering and reconstruction are plain recursion.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::{FlowError, FlowResult};
use crate::options::{join_options, split_options};
use crate::registry::AlgorithmRegistry;
use crate::schema::{AlgorithmSchema, OptionKind, SlotArity, SlotEncoding, SlotSpec};

/// Sub-instances bound to a slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    /// A single bound sub-instance
    Single(Box<AlgorithmInstance>),
    /// An ordered list of bound sub-instances
    List(Vec<AlgorithmInstance>),
}

impl SlotValue {
    /// Iterate over the bound sub-instances in order
    pub fn children(&self) -> impl Iterator<Item = &AlgorithmInstance> {
        match self {
            SlotValue::Single(child) => std::slice::from_ref(child.as_ref()).iter(),
            SlotValue::List(children) => children.iter(),
        }
    }

    /// Number of bound sub-instances
    pub fn len(&self) -> usize {
        match self {
            SlotValue::Single(_) => 1,
            SlotValue::List(children) => children.len(),
        }
    }

    /// True when no sub-instance is bound (empty list slot)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A configured algorithm instance, possibly owning nested sub-instances
///
/// Instances are created through [`AlgorithmRegistry::instantiate`], which
/// fills scalar defaults and constructs default sub-instances for single
/// slots. All mutation goes through schema-checked setters.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmInstance {
    schema: Arc<AlgorithmSchema>,
    scalars: IndexMap<String, String>,
    flags: IndexMap<String, bool>,
    slots: IndexMap<String, SlotValue>,
}

impl AlgorithmInstance {
    /// Build a bare instance from a schema: scalar defaults, flags off,
    /// list slots empty. Single slots are bound by the registry afterwards.
    pub(crate) fn from_schema(schema: Arc<AlgorithmSchema>) -> Self {
        let mut scalars = IndexMap::new();
        let mut flags = IndexMap::new();
        for option in &schema.options {
            match &option.kind {
                OptionKind::Scalar { default } => {
                    scalars.insert(option.code.clone(), default.clone());
                }
                OptionKind::Flag => {
                    flags.insert(option.code.clone(), false);
                }
            }
        }
        let mut slots = IndexMap::new();
        for slot in &schema.slots {
            if slot.arity == SlotArity::List {
                slots.insert(slot.code.clone(), SlotValue::List(Vec::new()));
            }
        }
        Self {
            schema,
            scalars,
            flags,
            slots,
        }
    }

    pub(crate) fn bind_default_child(&mut self, code: &str, child: AlgorithmInstance) {
        self.slots
            .insert(code.to_string(), SlotValue::Single(Box::new(child)));
    }

    /// Class identifier of this instance
    pub fn class_id(&self) -> &str {
        &self.schema.class_id
    }

    /// Schema this instance was constructed from
    pub fn schema(&self) -> &AlgorithmSchema {
        &self.schema
    }

    /// Current value of a scalar option
    pub fn option_value(&self, code: &str) -> Option<&str> {
        self.scalars.get(code).map(String::as_str)
    }

    /// Set a scalar option value
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::OptionMismatch`] when the schema declares no
    /// scalar option with this code.
    pub fn set_option(&mut self, code: &str, value: impl Into<String>) -> FlowResult<()> {
        if !self.scalars.contains_key(code) {
            return Err(self.mismatch(format!("-{code}")));
        }
        self.scalars.insert(code.to_string(), value.into());
        Ok(())
    }

    /// True when a boolean flag is enabled
    pub fn flag_enabled(&self, code: &str) -> bool {
        self.flags.get(code).copied().unwrap_or(false)
    }

    /// Enable or disable a boolean flag
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::OptionMismatch`] when the schema declares no flag
    /// with this code.
    pub fn set_flag(&mut self, code: &str, enabled: bool) -> FlowResult<()> {
        if !self.flags.contains_key(code) {
            return Err(self.mismatch(format!("-{code}")));
        }
        self.flags.insert(code.to_string(), enabled);
        Ok(())
    }

    /// Bound value of a slot, if any
    pub fn slot(&self, code: &str) -> Option<&SlotValue> {
        self.slots.get(code)
    }

    /// The single sub-instance bound to a slot
    pub fn slot_child(&self, code: &str) -> Option<&AlgorithmInstance> {
        match self.slots.get(code) {
            Some(SlotValue::Single(child)) => Some(child),
            _ => None,
        }
    }

    /// The sub-instances bound to a list slot
    pub fn slot_children(&self, code: &str) -> &[AlgorithmInstance] {
        match self.slots.get(code) {
            Some(SlotValue::List(children)) => children,
            _ => &[],
        }
    }

    /// Mutable access to the sub-instances bound to a slot, in order
    pub(crate) fn slot_children_mut(
        &mut self,
        code: &str,
    ) -> impl Iterator<Item = &mut AlgorithmInstance> {
        let children: Vec<&mut AlgorithmInstance> = match self.slots.get_mut(code) {
            Some(SlotValue::Single(child)) => vec![child.as_mut()],
            Some(SlotValue::List(children)) => children.iter_mut().collect(),
            None => Vec::new(),
        };
        children.into_iter()
    }

    fn slot_spec(&self, code: &str) -> FlowResult<&SlotSpec> {
        self.schema.slot(code).ok_or_else(|| FlowError::SlotNotFound {
            class_id: self.schema.class_id.clone(),
            slot: code.to_string(),
        })
    }

    fn check_category(&self, spec: &SlotSpec, child: &AlgorithmInstance) -> FlowResult<()> {
        if child.schema.category != spec.category {
            return Err(FlowError::CategoryMismatch {
                class_id: self.schema.class_id.clone(),
                slot: spec.code.clone(),
                expected: spec.category.display_name().to_string(),
                actual: child.schema.category.display_name().to_string(),
            });
        }
        Ok(())
    }

    /// Bind a sub-instance to a single-valued slot, replacing the current one
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::SlotNotFound`] for undeclared slots,
    /// [`FlowError::OptionMismatch`] when the slot is list-valued, and
    /// [`FlowError::CategoryMismatch`] for a sub-instance of the wrong
    /// category.
    pub fn set_slot(&mut self, code: &str, child: AlgorithmInstance) -> FlowResult<()> {
        let spec = self.slot_spec(code)?.clone();
        if spec.arity == SlotArity::List {
            return Err(self.mismatch(format!("-{code}")));
        }
        self.check_category(&spec, &child)?;
        self.slots
            .insert(code.to_string(), SlotValue::Single(Box::new(child)));
        Ok(())
    }

    /// Append a sub-instance to a list-valued slot
    pub fn push_slot_child(&mut self, code: &str, child: AlgorithmInstance) -> FlowResult<()> {
        let spec = self.slot_spec(code)?.clone();
        if spec.arity != SlotArity::List {
            return Err(self.mismatch(format!("-{code}")));
        }
        self.check_category(&spec, &child)?;
        match self.slots.get_mut(code) {
            Some(SlotValue::List(children)) => children.push(child),
            _ => {
                self.slots
                    .insert(code.to_string(), SlotValue::List(vec![child]));
            }
        }
        Ok(())
    }

    /// Replace the contents of a list-valued slot
    pub fn set_slot_children(
        &mut self,
        code: &str,
        children: Vec<AlgorithmInstance>,
    ) -> FlowResult<()> {
        let spec = self.slot_spec(code)?.clone();
        if spec.arity != SlotArity::List {
            return Err(self.mismatch(format!("-{code}")));
        }
        for child in &children {
            self.check_category(&spec, child)?;
        }
        self.slots.insert(code.to_string(), SlotValue::List(children));
        Ok(())
    }

    /// Render the flat option token list
    ///
    /// Scalars and flags come first in schema order, then quoted slot tokens,
    /// then the trailing slot as `-c <class> -- <options...>`. The `--`
    /// separator is always emitted, even for a sub-instance with no options.
    pub fn options(&self) -> Vec<String> {
        self.options_at_depth(0)
    }

    /// Depth counts how many quoted spec tokens enclose the rendering. Slot
    /// children inside an already-quoted spec render as a bare class id: the
    /// encoding nests quoted specs one level deep only. Trailing slots keep
    /// their depth, so `--` chains nest without limit.
    fn options_at_depth(&self, depth: usize) -> Vec<String> {
        let mut tokens = Vec::new();
        for option in &self.schema.options {
            match &option.kind {
                OptionKind::Scalar { .. } => {
                    if let Some(value) = self.scalars.get(&option.code) {
                        tokens.push(format!("-{}", option.code));
                        tokens.push(value.clone());
                    }
                }
                OptionKind::Flag => {
                    if self.flag_enabled(&option.code) {
                        tokens.push(format!("-{}", option.code));
                    }
                }
            }
        }

        let mut trailing: Option<(&SlotSpec, &AlgorithmInstance)> = None;
        for slot in &self.schema.slots {
            let Some(value) = self.slots.get(&slot.code) else {
                continue;
            };
            match slot.encoding {
                SlotEncoding::Quoted => {
                    for child in value.children() {
                        tokens.push(format!("-{}", slot.code));
                        if depth == 0 {
                            tokens.push(child.spec_string());
                        } else {
                            tokens.push(child.class_id().to_string());
                        }
                    }
                }
                SlotEncoding::Trailing => {
                    if let SlotValue::Single(child) = value {
                        trailing = Some((slot, child.as_ref()));
                    }
                }
            }
        }

        if let Some((slot, child)) = trailing {
            tokens.push(format!("-{}", slot.code));
            tokens.push(child.class_id().to_string());
            tokens.push("--".to_string());
            tokens.extend(child.options_at_depth(depth));
        }

        tokens
    }

    /// Render `"<class id> <options joined by single spaces>"`, the spec form
    /// embedded in quoted slot tokens and composite parameter defaults
    pub fn spec_string(&self) -> String {
        let options = self.options_at_depth(1);
        if options.is_empty() {
            self.class_id().to_string()
        } else {
            format!("{} {}", self.class_id(), join_options(&options))
        }
    }

    /// Apply a flat option token list, the inverse of [`Self::options`]
    ///
    /// Slot tokens recursively instantiate and bind sub-instances through the
    /// registry. Quoted list slots are cleared before the first spec is
    /// applied, so applying a rendered stream reproduces the source bindings.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::OptionMismatch`] for tokens the schema does not
    /// declare or for missing option values, and propagates registry errors
    /// for unknown sub-instance classes.
    pub fn apply_options(
        &mut self,
        registry: &AlgorithmRegistry,
        tokens: &[String],
    ) -> FlowResult<()> {
        let mut cleared_lists: Vec<String> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let Some(code) = token.strip_prefix('-') else {
                return Err(self.mismatch(token.as_str()));
            };

            if let Some(option) = self.schema.option(code) {
                match &option.kind {
                    OptionKind::Scalar { .. } => {
                        let value = tokens
                            .get(i + 1)
                            .ok_or_else(|| self.mismatch(token.as_str()))?
                            .clone();
                        self.scalars.insert(code.to_string(), value);
                        i += 2;
                    }
                    OptionKind::Flag => {
                        self.flags.insert(code.to_string(), true);
                        i += 1;
                    }
                }
                continue;
            }

            let Some(slot) = self.schema.slot(code).cloned() else {
                return Err(self.mismatch(token.as_str()));
            };

            match slot.encoding {
                SlotEncoding::Quoted => {
                    let spec = tokens.get(i + 1).ok_or_else(|| self.mismatch(token.as_str()))?;
                    let child = instantiate_from_spec(registry, &slot.code, spec)?;
                    match slot.arity {
                        SlotArity::Single { .. } => self.set_slot(&slot.code, child)?,
                        SlotArity::List => {
                            if !cleared_lists.contains(&slot.code) {
                                self.set_slot_children(&slot.code, Vec::new())?;
                                cleared_lists.push(slot.code.clone());
                            }
                            self.push_slot_child(&slot.code, child)?;
                        }
                    }
                    i += 2;
                }
                SlotEncoding::Trailing => {
                    let class_id = tokens.get(i + 1).ok_or_else(|| self.mismatch(token.as_str()))?;
                    let mut child = registry.instantiate(class_id)?;
                    let mut rest = i + 2;
                    if tokens.get(rest).map(String::as_str) == Some("--") {
                        rest += 1;
                    }
                    child.apply_options(registry, &tokens[rest..])?;
                    self.set_slot(&slot.code, child)?;
                    i = tokens.len();
                }
            }
        }
        Ok(())
    }

    /// Composite flow name: `ClassId(child1[,child2...])` in slot order,
    /// the class id alone for a leaf
    pub fn flow_name(&self) -> String {
        let mut child_names = Vec::new();
        for slot in &self.schema.slots {
            if let Some(value) = self.slots.get(&slot.code) {
                for child in value.children() {
                    child_names.push(child.flow_name());
                }
            }
        }
        if child_names.is_empty() {
            self.class_id().to_string()
        } else {
            format!("{}({})", self.class_id(), child_names.join(","))
        }
    }

    /// Number of distinct instances in this tree, the root included
    pub fn component_count(&self) -> usize {
        let mut count = 1;
        for value in self.slots.values() {
            for child in value.children() {
                count += child.component_count();
            }
        }
        count
    }

    /// True when any bound sub-instance is reached through a slot
    pub fn is_composite(&self) -> bool {
        self.slots.values().any(|v| !v.is_empty())
    }

    /// True when some quoted slot binds a sub-instance that is itself
    /// composite. Such grandchildren render as bare class ids inside the
    /// quoted spec, so their configuration does not survive token rendering.
    pub fn has_shallow_encoded_descendants(&self) -> bool {
        for slot in &self.schema.slots {
            let Some(value) = self.slots.get(&slot.code) else {
                continue;
            };
            for child in value.children() {
                match slot.encoding {
                    SlotEncoding::Quoted => {
                        if child.is_composite() {
                            return true;
                        }
                    }
                    SlotEncoding::Trailing => {
                        if child.has_shallow_encoded_descendants() {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    fn mismatch(&self, token: impl Into<String>) -> FlowError {
        FlowError::OptionMismatch {
            class_id: self.schema.class_id.clone(),
            token: token.into(),
        }
    }
}

/// Parse `"<class id> <options...>"` and build the described instance
pub(crate) fn instantiate_from_spec(
    registry: &AlgorithmRegistry,
    parameter: &str,
    spec: &str,
) -> FlowResult<AlgorithmInstance> {
    let tokens = split_options(spec)
        .map_err(|_| FlowError::malformed(parameter, "unbalanced quoting in sub-instance spec"))?;
    let Some((class_id, rest)) = tokens.split_first() else {
        return Err(FlowError::malformed(parameter, "empty sub-instance spec"));
    };
    if class_id.starts_with('-') {
        return Err(FlowError::malformed(
            parameter,
            format!("spec must start with a class identifier, got '{class_id}'"),
        ));
    }
    let mut child = registry.instantiate(class_id)?;
    child.apply_options(registry, rest)?;
    Ok(child)
}
