//! Errors raised while building a manifest.

use thiserror::Error;

/// Result type for manifest construction.
pub type ManifestResult<T> = Result<T, ManifestError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    /// `build()` was called before `with_package_info()`.
    #[error("package info is required: call with_package_info() before build()")]
    MissingPackageInfo,

    /// A required package info field was empty.
    #[error("invalid package info: {field} must not be empty")]
    InvalidPackageInfo { field: &'static str },

    /// The package name cannot be used as a directory key.
    #[error("invalid package name {name:?}: {reason}")]
    InvalidPackageName { name: String, reason: &'static str },

    /// A recorded path still holds a `${NAME}` placeholder after substitution.
    #[error("unresolved variable {variable} in {field}: {value}")]
    UnresolvedVariable {
        field: &'static str,
        variable: String,
        value: String,
    },
}
