// Copyright 2025 Cowboy AI, LLC.

//! # CIM Flow
//!
//! Deterministic flow composition for the Composable Information Machine:
//! convert configured algorithm instance trees into named, versioned "flow"
//! descriptors suitable for remote storage, and reconstruct equivalent
//! instance trees from downloaded descriptors.
//!
//! The crate provides the building blocks of that bridge:
//! - **Schemas**: each algorithm class is a structural record of its option
//!   codes and sub-instance slots
//! - **Registry**: the startup lookup table from class identifiers to
//!   schemas, and the only constructor of instances
//! - **Instances**: explicit configuration trees owning their sub-instances
//!   by value
//! - **Composer**: the pure `compose`/`decompose` pair between instance
//!   trees and flow descriptors
//! - **Setups**: recorded parameter values of a prior execution, replayable
//!   onto a flow's structure
//! - **Store**: the seam to the remote platform, with an in-memory
//!   implementation for tests
//!
//! ## Design Principles
//!
//! 1. **Explicit over reflective**: algorithm capabilities live in declared
//!    schemas, not runtime type inspection
//! 2. **Tree-shaped**: composition owns children by value; no cycles, no
//!    parent back-references
//! 3. **Deterministic**: composing is a pure function of the instance tree;
//!    equal trees produce byte-identical canonical text
//! 4. **Fail fast**: decoding surfaces the first unknown class or malformed
//!    encoding; there are no partial results
//!
//! ## Example
//!
//! ```rust
//! use cim_flow::{compose, decompose, AlgorithmRegistry};
//!
//! let registry = AlgorithmRegistry::with_catalog();
//!
//! let mut ensemble = registry.instantiate("learn.meta.Boosting")?;
//! ensemble.set_slot("W", registry.instantiate("learn.tree.Cart")?)?;
//!
//! let flow = compose(&ensemble, &[])?;
//! assert_eq!(flow.name, "learn.meta.Boosting(learn.tree.Cart)");
//!
//! let rebuilt = decompose(&registry, &flow)?;
//! assert_eq!(rebuilt.options(), ensemble.options());
//! # Ok::<(), cim_flow::FlowError>(())
//! ```

#![warn(missing_docs)]

mod catalog;
mod composer;
mod config;
mod errors;
mod flow;
mod instance;
mod options;
mod registry;
mod schema;
mod setup;
mod store;

// Re-export core types
pub use catalog::builtin_schemas;
pub use composer::{compose, decompose};
pub use config::PlatformConfig;
pub use errors::{FlowError, FlowResult};
pub use flow::{
    count_flow_components, parameter_values_to_json, Component, Flow, Parameter,
    DATA_TYPE_COMPONENT, DATA_TYPE_FLAG, DATA_TYPE_OPTION,
};
pub use instance::{AlgorithmInstance, SlotValue};
pub use options::{join_options, quote_token, split_options};
pub use registry::AlgorithmRegistry;
pub use schema::{
    AlgorithmSchema, Category, OptionKind, OptionSpec, SlotArity, SlotEncoding, SlotSpec,
};
pub use setup::{instance_from_setup, setup_from_instance, Setup, SetupParameter};
pub use store::{
    upload_or_reuse, FlowId, FlowStore, FlowStoreError, InMemoryFlowStore, UploadReceipt,
};
