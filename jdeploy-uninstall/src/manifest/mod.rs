//! Uninstall manifest model and construction.
//!
//! - [`UninstallManifest`] and its entry types describe what an install did.
//! - [`ManifestBuilder`] assembles a manifest, resolving `${VAR}` placeholders
//!   as entries are added.
//! - [`fully_qualified_name`] derives the on-disk key for `(name, source)`.

mod builder;
mod error;
mod model;
mod naming;
mod types;

pub use builder::ManifestBuilder;
pub use error::{ManifestError, ManifestResult};
pub use model::{
    AgentEntry, AiIntegrations, GitBashProfileEntry, InstalledDirectory, InstalledFile,
    McpServerEntry, ModifiedRegistryValue, PackageInfo, PathModifications, RegistryInfo,
    RegistryKey, ShellProfileEntry, SkillEntry, UninstallManifest, WindowsPathEntry,
    MANIFEST_VERSION,
};
pub use naming::{check_package_name, fully_qualified_name, md5_hex};
pub use types::{CleanupStrategy, FileType, RegistryRoot, RegistryValueType};
