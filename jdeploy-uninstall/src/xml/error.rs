//! Error types for the XML layer.

use thiserror::Error;

pub type XmlResult<T> = Result<T, XmlError>;

pub type ParseResult<T> = Result<T, ParseError>;

/// Low-level read/write failures of the element tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document contains a second root element '{0}'")]
    MultipleRoots(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("failed to serialize XML: {0}")]
    Write(String),
}

/// A manifest document failed basic or schema validation.
///
/// `message` is a one-line summary; [`details`](Self::details) lists every
/// violation found.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ManifestValidationError {
    message: String,
    details: Option<String>,
}

impl ManifestValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Detailed description, falling back to the message.
    pub fn details(&self) -> &str {
        self.details.as_deref().unwrap_or(&self.message)
    }
}

/// Converting a document into the manifest model failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Invalid(#[from] ManifestValidationError),

    #[error("missing element <{element}> in {path}")]
    MissingElement { path: String, element: String },

    #[error("missing attribute '{attribute}' on {path}")]
    MissingAttribute { path: String, attribute: String },

    #[error("invalid value '{value}' for {attribute} on {path}")]
    InvalidToken {
        path: String,
        attribute: String,
        value: String,
    },

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}
