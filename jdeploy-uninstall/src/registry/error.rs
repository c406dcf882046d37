//! Error types for registry access.

use thiserror::Error;

use crate::manifest::{RegistryRoot, RegistryValueType};

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry key not found: {root}\\{key}")]
    KeyNotFound { root: RegistryRoot, key: String },

    #[error("registry value not found: {root}\\{key} \\ {name}")]
    ValueNotFound {
        root: RegistryRoot,
        key: String,
        name: String,
    },

    /// Non-recursive key deletion refused because the key still has children.
    #[error("registry key {root}\\{key} still has subkeys")]
    HasSubkeys { root: RegistryRoot, key: String },

    /// A recorded value could not be converted to its declared type.
    #[error("invalid {value_type} value '{value}': {reason}")]
    InvalidValue {
        value_type: RegistryValueType,
        value: String,
        reason: String,
    },

    /// The operating system rejected the call.
    #[error("{operation} failed for {root}\\{key} (error {code})")]
    Os {
        operation: &'static str,
        root: RegistryRoot,
        key: String,
        code: u32,
    },
}
