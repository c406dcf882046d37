//! Error types for manifest persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::manifest::ManifestError;
use crate::xml::{ManifestValidationError, ParseError, XmlError};

/// Result type for writer and repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    #[error("failed to delete {}: {source}", path.display())]
    DeleteFailed { path: PathBuf, source: io::Error },

    /// The destination path was empty or had no file name.
    #[error("invalid manifest destination: {0}")]
    InvalidDestination(String),

    /// The package identity does not map to a manifest location.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("manifest validation failed: {}", .0.details())]
    Validation(#[from] ManifestValidationError),

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("failed to parse manifest {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },
}
