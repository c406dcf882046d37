//! jDeploy uninstall subsystem
//!
//! At install time the platform installers record every side effect they
//! produce (files, directories, registry keys and values, PATH edits, AI tool
//! registrations) into an uninstall manifest. At uninstall time the
//! [`UninstallService`] loads that manifest and reverses each recorded effect.
//!
//! # Layers
//!
//! ```text
//! manifest   model + builder with ${VAR} substitution
//! xml        document tree, generator, parser, validator
//! store      writer (atomic) + repository keyed by (name, source)
//! registry   RegistryOperations capability (in-memory, Windows)
//! uninstall  UninstallService phase pipeline
//! ```

pub mod config;
pub mod layout;
pub mod logging;
pub mod manifest;
pub mod platform;
pub mod registry;
pub mod store;
pub mod uninstall;
pub mod xml;

pub use config::{ConfigError, UninstallConfig};
pub use layout::Layout;
pub use manifest::{ManifestBuilder, UninstallManifest};
pub use store::{FileManifestRepository, ManifestRepository, ManifestWriter};
pub use uninstall::{UninstallResult, UninstallService};
pub use xml::{ManifestValidationError, ValidationMode};
