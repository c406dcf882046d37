//! Uninstall manifest data model.
//!
//! Plain data describing the side effects of one package installation.
//! Paths are kept as strings because a manifest may describe a Windows
//! install while being inspected elsewhere.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{CleanupStrategy, FileType, RegistryRoot, RegistryValueType};

/// Schema version written by this crate.
pub const MANIFEST_VERSION: &str = "1.0";

/// Root aggregate: everything one installation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallManifest {
    pub version: String,
    pub package_info: PackageInfo,
    pub files: Vec<InstalledFile>,
    pub directories: Vec<InstalledDirectory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_modifications: Option<PathModifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_integrations: Option<AiIntegrations>,
}

impl UninstallManifest {
    /// Create an empty manifest for a package.
    pub fn new(package_info: PackageInfo) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            package_info,
            files: Vec::new(),
            directories: Vec::new(),
            registry: None,
            path_modifications: None,
            ai_integrations: None,
        }
    }

    /// Total number of recorded side effects.
    pub fn entry_count(&self) -> usize {
        let registry = self
            .registry
            .as_ref()
            .map(|r| r.created_keys.len() + r.modified_values.len())
            .unwrap_or(0);
        let path = self
            .path_modifications
            .as_ref()
            .map(|p| p.windows_paths.len() + p.shell_profiles.len() + p.git_bash_profiles.len())
            .unwrap_or(0);
        let ai = self
            .ai_integrations
            .as_ref()
            .map(|a| a.mcp_servers.len() + a.skills.len() + a.agents.len())
            .unwrap_or(0);
        self.files.len() + self.directories.len() + registry + path + ai
    }
}

/// Identity and provenance of the installed package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub name: String,
    /// `None` for npm packages, the repository URL for GitHub packages.
    pub source: Option<String>,
    pub version: String,
    pub fully_qualified_name: String,
    pub architecture: String,
    pub installed_at: DateTime<Utc>,
    pub installer_version: String,
}

impl PackageInfo {
    /// True when the package came from a GitHub repository.
    pub fn is_github(&self) -> bool {
        self.source.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledFile {
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InstalledFile {
    pub fn new(path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledDirectory {
    pub path: String,
    pub cleanup: CleanupStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InstalledDirectory {
    pub fn new(path: impl Into<String>, cleanup: CleanupStrategy) -> Self {
        Self {
            path: path.into(),
            cleanup,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Windows registry side effects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryInfo {
    pub created_keys: Vec<RegistryKey>,
    pub modified_values: Vec<ModifiedRegistryValue>,
}

impl RegistryInfo {
    pub fn is_empty(&self) -> bool {
        self.created_keys.is_empty() && self.modified_values.is_empty()
    }
}

/// A key the installer created. Deleted recursively on uninstall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryKey {
    pub root: RegistryRoot,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A value the installer created or overwrote.
///
/// `previous_value == None` means the value did not exist before install and
/// must be deleted rather than restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedRegistryValue {
    pub root: RegistryRoot,
    pub path: String,
    pub name: String,
    pub previous_value: Option<String>,
    pub previous_type: RegistryValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// PATH edits made by the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathModifications {
    pub windows_paths: Vec<WindowsPathEntry>,
    pub shell_profiles: Vec<ShellProfileEntry>,
    pub git_bash_profiles: Vec<GitBashProfileEntry>,
}

impl PathModifications {
    pub fn is_empty(&self) -> bool {
        self.windows_paths.is_empty()
            && self.shell_profiles.is_empty()
            && self.git_bash_profiles.is_empty()
    }
}

/// An entry appended to the user's `Path` environment value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsPathEntry {
    pub added_entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An export line appended to a POSIX shell startup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellProfileEntry {
    pub file: String,
    pub export_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An export line appended to a Git-Bash startup file on Windows.
///
/// Same shape as [`ShellProfileEntry`] but the line uses `$HOME`-relative
/// POSIX paths, so it is matched differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBashProfileEntry {
    pub file: String,
    pub export_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Registrations with AI tools (MCP servers, skills, agents).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiIntegrations {
    pub mcp_servers: Vec<McpServerEntry>,
    pub skills: Vec<SkillEntry>,
    pub agents: Vec<AgentEntry>,
}

impl AiIntegrations {
    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty() && self.skills.is_empty() && self.agents.is_empty()
    }
}

/// An MCP server entry added to an AI tool's configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerEntry {
    pub config_file: String,
    pub entry_key: String,
    pub tool_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEntry {
    pub path: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PackageInfo {
        PackageInfo {
            name: "my-app".to_string(),
            source: None,
            version: "1.0.0".to_string(),
            fully_qualified_name: "my-app".to_string(),
            architecture: "x64".to_string(),
            installed_at: Utc::now(),
            installer_version: "1.0.0".to_string(),
        }
    }

    #[test]
    fn test_new_manifest_is_empty() {
        let manifest = UninstallManifest::new(info());
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.entry_count(), 0);
        assert!(manifest.registry.is_none());
    }

    #[test]
    fn test_entry_count_spans_all_groups() {
        let mut manifest = UninstallManifest::new(info());
        manifest
            .files
            .push(InstalledFile::new("/opt/app/bin/app", FileType::Binary));
        manifest.registry = Some(RegistryInfo {
            created_keys: vec![RegistryKey {
                root: RegistryRoot::CurrentUser,
                path: "Software\\App".to_string(),
                description: None,
            }],
            modified_values: Vec::new(),
        });
        manifest.ai_integrations = Some(AiIntegrations {
            skills: vec![SkillEntry {
                path: "/home/me/.claude/skills/app".to_string(),
                name: "app".to_string(),
            }],
            ..Default::default()
        });
        assert_eq!(manifest.entry_count(), 3);
    }

    #[test]
    fn test_is_github() {
        let mut info = info();
        assert!(!info.is_github());
        info.source = Some("https://github.com/owner/repo".to_string());
        assert!(info.is_github());
    }

    #[test]
    fn test_builders_set_description() {
        let file = InstalledFile::new("/a", FileType::Icon).with_description("icon");
        assert_eq!(file.description.as_deref(), Some("icon"));
        let dir = InstalledDirectory::new("/b", CleanupStrategy::Always).with_description("");
        assert_eq!(dir.description.as_deref(), Some(""));
    }
}
