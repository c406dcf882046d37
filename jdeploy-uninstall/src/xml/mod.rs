//! XML codec and validation for uninstall manifests.
//!
//! The document layout is versioned and namespaced:
//!
//! ```text
//! <uninstallManifest version="1.0" xmlns="http://jdeploy.ca/uninstall-manifest/1.0">
//!   <packageInfo>...</packageInfo>
//!   <files>...</files>
//!   <directories>...</directories>
//!   <registry>...</registry>                    optional
//!   <pathModifications>...</pathModifications>  optional
//!   <aiIntegrations>...</aiIntegrations>        optional
//! </uninstallManifest>
//! ```

mod document;
mod error;
mod generator;
mod parser;
pub mod schema;
mod validator;

pub use document::{XmlDocument, XmlElement};
pub use error::{ManifestValidationError, ParseError, ParseResult, XmlError, XmlResult};
pub use generator::{generate, generate_string};
pub use parser::{parse, parse_str};
pub use schema::NAMESPACE;
pub use validator::{validate_basic, validate_schema, ManifestValidator, ValidationMode};
