// Copyright 2025 Cowboy AI, LLC.

//! Typed schemas describing algorithm classes
//!
//! Each algorithm class is a structural record of its option codes and slot
//! codes, registered at startup in the [`crate::AlgorithmRegistry`]. This
//! replaces runtime type inspection: everything the composer needs to render
//! or parse a configuration is declared here.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, FlowResult};

/// Category of an algorithm class
///
/// Slots constrain the category of the sub-instances they accept, so a kernel
/// cannot be bound where a filter is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Category {
    /// A learner (classifier), plain or composite
    Learner,
    /// A data filter
    Filter,
    /// A kernel function
    Kernel,
    /// A neighbour search provider
    Search,
}

impl Category {
    /// Get a human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Learner => "Learner",
            Category::Filter => "Filter",
            Category::Kernel => "Kernel",
            Category::Search => "Search",
        }
    }
}

/// Kind of a scalar option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum OptionKind {
    /// An option that always carries a value (`-c value`)
    Scalar {
        /// Default value rendered when the option is unset
        default: String,
    },
    /// A boolean flag, rendered as a bare `-c` only when enabled
    Flag,
}

/// Declaration of a single option code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct OptionSpec {
    /// Short option code, without the leading dash
    pub code: String,
    /// What the option controls
    pub description: String,
    /// Scalar or flag
    pub kind: OptionKind,
}

impl OptionSpec {
    /// Declare a scalar option with a default value
    pub fn scalar(
        code: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            kind: OptionKind::Scalar {
                default: default.into(),
            },
        }
    }

    /// Declare a boolean flag
    pub fn flag(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            kind: OptionKind::Flag,
        }
    }
}

/// How many sub-instances a slot holds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SlotArity {
    /// Exactly one sub-instance, constructed from the default class when unset
    Single {
        /// Class identifier of the default sub-instance
        default_class: String,
    },
    /// Zero or more sub-instances
    List,
}

/// How a slot's sub-instance is rendered into the flat token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SlotEncoding {
    /// Inline quoted spec: `-c "<class> <options>"`, one token per child
    Quoted,
    /// Trailing spec: `-c <class> -- <options...>` at the end of the stream
    Trailing,
}

/// Declaration of a named sub-instance slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SlotSpec {
    /// Short slot code, without the leading dash
    pub code: String,
    /// What the slot holds
    pub description: String,
    /// Category of sub-instances the slot accepts
    pub category: Category,
    /// Single or list
    pub arity: SlotArity,
    /// Token encoding for the slot
    pub encoding: SlotEncoding,
}

impl SlotSpec {
    /// Declare a single-valued quoted slot with a default class
    pub fn quoted_single(
        code: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        default_class: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            category,
            arity: SlotArity::Single {
                default_class: default_class.into(),
            },
            encoding: SlotEncoding::Quoted,
        }
    }

    /// Declare a list-valued quoted slot
    pub fn quoted_list(
        code: impl Into<String>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            category,
            arity: SlotArity::List,
            encoding: SlotEncoding::Quoted,
        }
    }

    /// Declare the trailing single-valued slot (`-c <class> -- <options...>`)
    pub fn trailing(
        code: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        default_class: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            category,
            arity: SlotArity::Single {
                default_class: default_class.into(),
            },
            encoding: SlotEncoding::Trailing,
        }
    }
}

/// Structural record describing one algorithm class
///
/// The record is everything the composer knows about a class: its identifier,
/// category, declared options, and declared slots. Option and slot order is
/// significant; it fixes both token rendering order and composite name order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AlgorithmSchema {
    /// Dotted class identifier, e.g. `learn.meta.Bagging`
    pub class_id: String,
    /// Category of the class
    pub category: Category,
    /// What the algorithm does
    pub description: String,
    /// Declared options, in rendering order
    pub options: Vec<OptionSpec>,
    /// Declared slots, in rendering and naming order
    pub slots: Vec<SlotSpec>,
}

impl AlgorithmSchema {
    /// Create a schema with no options or slots
    pub fn new(
        class_id: impl Into<String>,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            category,
            description: description.into(),
            options: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Add an option declaration
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Add a slot declaration
    pub fn with_slot(mut self, slot: SlotSpec) -> Self {
        self.slots.push(slot);
        self
    }

    /// Look up an option by code
    pub fn option(&self, code: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.code == code)
    }

    /// Look up a slot by code
    pub fn slot(&self, code: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.code == code)
    }

    /// True when the schema declares at least one slot
    pub fn is_composite(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Validate structural constraints
    ///
    /// Codes must be non-empty and unique across options and slots. At most
    /// one slot may use [`SlotEncoding::Trailing`], and it must be the last
    /// declared slot: everything after the `--` separator belongs to it.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidSchema`] describing the first violation.
    pub fn validate(&self) -> FlowResult<()> {
        if self.class_id.is_empty() {
            return Err(self.invalid("class identifier is empty"));
        }
        if self.class_id.contains(['(', ')', ',', ' ']) {
            return Err(self.invalid("class identifier contains reserved characters"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for option in &self.options {
            if option.code.is_empty() {
                return Err(self.invalid("option code is empty"));
            }
            if !seen.insert(option.code.as_str()) {
                return Err(self.invalid(format!("duplicate code '{}'", option.code)));
            }
        }
        for slot in &self.slots {
            if slot.code.is_empty() {
                return Err(self.invalid("slot code is empty"));
            }
            if !seen.insert(slot.code.as_str()) {
                return Err(self.invalid(format!("duplicate code '{}'", slot.code)));
            }
        }

        let trailing: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.encoding == SlotEncoding::Trailing)
            .map(|(i, _)| i)
            .collect();
        if trailing.len() > 1 {
            return Err(self.invalid("more than one trailing slot"));
        }
        if let Some(&index) = trailing.first() {
            if index != self.slots.len() - 1 {
                return Err(self.invalid("trailing slot must be last"));
            }
            if let Some(slot) = self.slots.get(index) {
                if slot.arity == SlotArity::List {
                    return Err(self.invalid("trailing slot cannot be list-valued"));
                }
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> FlowError {
        FlowError::InvalidSchema {
            class_id: self.class_id.clone(),
            reason: reason.into(),
        }
    }
}
