// Copyright 2025 Cowboy AI, LLC.

//! Error types for flow composition and reconstruction

use thiserror::Error;

/// Errors that can occur while composing or decomposing flows
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// A class identifier has no resolvable schema in the algorithm registry
    #[error("Unknown algorithm class: {class_id}")]
    UnknownAlgorithmClass {
        /// Class identifier that could not be resolved
        class_id: String,
    },

    /// A composite parameter's default value failed to parse
    #[error("Malformed parameter encoding for '{parameter}': {reason}")]
    MalformedParameterEncoding {
        /// Name of the parameter whose value failed to parse
        parameter: String,
        /// Why the value was rejected
        reason: String,
    },

    /// An option token stream does not match the target schema
    #[error("Option mismatch for {class_id}: unexpected token '{token}'")]
    OptionMismatch {
        /// Class whose schema rejected the tokens
        class_id: String,
        /// Offending token
        token: String,
    },

    /// A schema was registered twice under the same class identifier
    #[error("Algorithm class already registered: {0}")]
    DuplicateAlgorithmClass(String),

    /// A schema failed structural validation
    #[error("Invalid schema for {class_id}: {reason}")]
    InvalidSchema {
        /// Class identifier of the rejected schema
        class_id: String,
        /// Why the schema was rejected
        reason: String,
    },

    /// A slot code was not declared by the instance's schema
    #[error("Slot not found: {class_id} has no slot '{slot}'")]
    SlotNotFound {
        /// Class whose schema was consulted
        class_id: String,
        /// Slot code that was requested
        slot: String,
    },

    /// A sub-instance was bound to a slot of an incompatible category
    #[error("Category mismatch: slot '{slot}' of {class_id} accepts {expected}, got {actual}")]
    CategoryMismatch {
        /// Class owning the slot
        class_id: String,
        /// Slot code
        slot: String,
        /// Category the slot accepts
        expected: String,
        /// Category of the rejected sub-instance
        actual: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::SerializationError(err.to_string())
    }
}

impl FlowError {
    /// Create a malformed-encoding error for a named parameter
    pub fn malformed(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        FlowError::MalformedParameterEncoding {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error arose while decoding a descriptor
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            FlowError::UnknownAlgorithmClass { .. }
                | FlowError::MalformedParameterEncoding { .. }
                | FlowError::OptionMismatch { .. }
        )
    }

    /// Check if this error arose while registering a schema
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            FlowError::DuplicateAlgorithmClass(_) | FlowError::InvalidSchema { .. }
        )
    }
}
