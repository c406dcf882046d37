//! Fluent construction of [`UninstallManifest`] values.
//!
//! Installers record side effects as they happen, often with paths written
//! relative to a well-known root:
//!
//! ```text
//! ${USER_HOME}     home directory
//! ${JDEPLOY_HOME}  per-user jDeploy data root (default ~/.jdeploy)
//! ${APP_DIR}       ${JDEPLOY_HOME}/apps/<fqn>, set by with_package_info()
//! ```
//!
//! Placeholders are substituted the moment an entry is added, so the builder
//! never holds unresolved paths. `build()` consumes the builder; a fresh
//! instance is required for every manifest.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::error::{ManifestError, ManifestResult};
use super::model::{
    AgentEntry, AiIntegrations, GitBashProfileEntry, InstalledDirectory, InstalledFile,
    McpServerEntry, ModifiedRegistryValue, PackageInfo, PathModifications, RegistryInfo,
    RegistryKey, ShellProfileEntry, SkillEntry, UninstallManifest, WindowsPathEntry,
};
use super::naming::{check_package_name, fully_qualified_name};
use super::types::{CleanupStrategy, FileType, RegistryRoot, RegistryValueType};
use crate::layout::Layout;

pub const VAR_USER_HOME: &str = "USER_HOME";
pub const VAR_JDEPLOY_HOME: &str = "JDEPLOY_HOME";
pub const VAR_APP_DIR: &str = "APP_DIR";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

#[derive(Debug, Clone)]
struct PendingPackage {
    name: String,
    source: Option<String>,
    version: String,
    architecture: String,
    fully_qualified_name: String,
}

/// Accumulates side effects for one installation.
///
/// # Example
///
/// ```
/// use jdeploy_uninstall::layout::Layout;
/// use jdeploy_uninstall::manifest::{CleanupStrategy, FileType, ManifestBuilder};
///
/// let layout = Layout::new("/home/me", "/home/me/.jdeploy", "x64");
/// let manifest = ManifestBuilder::new(&layout)
///     .with_package_info("my-app", None, "1.2.0", "x64")
///     .unwrap()
///     .add_file("${APP_DIR}/bin/my-app", FileType::Binary, None)
///     .add_directory("${APP_DIR}", CleanupStrategy::Always, None)
///     .build()
///     .unwrap();
///
/// assert_eq!(manifest.files[0].path, "/home/me/.jdeploy/apps/my-app/bin/my-app");
/// assert_eq!(manifest.package_info.installer_version, "1.2.0");
/// ```
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    variables: BTreeMap<String, String>,
    package: Option<PendingPackage>,
    installed_at: DateTime<Utc>,
    installer_version: Option<String>,
    files: Vec<InstalledFile>,
    directories: Vec<InstalledDirectory>,
    created_keys: Vec<RegistryKey>,
    modified_values: Vec<ModifiedRegistryValue>,
    windows_paths: Vec<WindowsPathEntry>,
    shell_profiles: Vec<ShellProfileEntry>,
    git_bash_profiles: Vec<GitBashProfileEntry>,
    mcp_servers: Vec<McpServerEntry>,
    skills: Vec<SkillEntry>,
    agents: Vec<AgentEntry>,
}

impl ManifestBuilder {
    /// Create a builder seeded with `${USER_HOME}` and `${JDEPLOY_HOME}`
    /// from the given layout.
    pub fn new(layout: &Layout) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert(VAR_USER_HOME.to_string(), path_string(layout.home_dir()));
        variables.insert(
            VAR_JDEPLOY_HOME.to_string(),
            path_string(layout.jdeploy_home()),
        );
        Self {
            variables,
            package: None,
            installed_at: Utc::now(),
            installer_version: None,
            files: Vec::new(),
            directories: Vec::new(),
            created_keys: Vec::new(),
            modified_values: Vec::new(),
            windows_paths: Vec::new(),
            shell_profiles: Vec::new(),
            git_bash_profiles: Vec::new(),
            mcp_servers: Vec::new(),
            skills: Vec::new(),
            agents: Vec::new(),
        }
    }

    /// Set the package identity. Must be called before any entry that uses
    /// `${APP_DIR}`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidPackageInfo`] when `name`, `version`
    /// or `architecture` is empty, and [`ManifestError::InvalidPackageName`]
    /// when `name` would not stay inside its own directory.
    pub fn with_package_info(
        mut self,
        name: &str,
        source: Option<&str>,
        version: &str,
        architecture: &str,
    ) -> ManifestResult<Self> {
        for (field, value) in [
            ("name", name),
            ("version", version),
            ("architecture", architecture),
        ] {
            if value.trim().is_empty() {
                return Err(ManifestError::InvalidPackageInfo { field });
            }
        }
        check_package_name(name)?;

        let fqn = fully_qualified_name(name, source);
        let app_dir = Path::new(&self.variables[VAR_JDEPLOY_HOME])
            .join("apps")
            .join(&fqn);
        self.variables
            .insert(VAR_APP_DIR.to_string(), path_string(&app_dir));

        self.package = Some(PendingPackage {
            name: name.to_string(),
            source: source.map(str::to_string),
            version: version.to_string(),
            architecture: architecture.to_string(),
            fully_qualified_name: fqn,
        });
        Ok(self)
    }

    /// Rebind `${APP_DIR}` to `${USER_HOME}/<win_app_dir>/<fqn>`.
    ///
    /// Ignored when called before [`with_package_info`](Self::with_package_info)
    /// or with an empty directory.
    pub fn with_win_app_dir(mut self, win_app_dir: &str) -> Self {
        if win_app_dir.is_empty() {
            return self;
        }
        if let Some(package) = &self.package {
            let app_dir = Path::new(&self.variables[VAR_USER_HOME])
                .join(win_app_dir)
                .join(&package.fully_qualified_name);
            self.variables
                .insert(VAR_APP_DIR.to_string(), path_string(&app_dir));
        }
        self
    }

    pub fn with_installer_version(mut self, version: impl Into<String>) -> Self {
        self.installer_version = Some(version.into());
        self
    }

    pub fn with_installed_at(mut self, installed_at: DateTime<Utc>) -> Self {
        self.installed_at = installed_at;
        self
    }

    /// Register a custom `${NAME}` substitution.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Current value of a substitution variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn add_file(mut self, path: &str, file_type: FileType, description: Option<&str>) -> Self {
        let entry = InstalledFile {
            path: self.substitute(path),
            file_type,
            description: self.substitute_opt(description),
        };
        self.files.push(entry);
        self
    }

    pub fn add_directory(
        mut self,
        path: &str,
        cleanup: CleanupStrategy,
        description: Option<&str>,
    ) -> Self {
        let entry = InstalledDirectory {
            path: self.substitute(path),
            cleanup,
            description: self.substitute_opt(description),
        };
        self.directories.push(entry);
        self
    }

    pub fn add_created_registry_key(
        mut self,
        root: RegistryRoot,
        path: &str,
        description: Option<&str>,
    ) -> Self {
        let entry = RegistryKey {
            root,
            path: self.substitute(path),
            description: self.substitute_opt(description),
        };
        self.created_keys.push(entry);
        self
    }

    /// Record a value the installer set. Pass `previous_value = None` when the
    /// value did not exist before.
    pub fn add_modified_registry_value(
        mut self,
        root: RegistryRoot,
        path: &str,
        name: &str,
        previous_value: Option<&str>,
        previous_type: RegistryValueType,
        description: Option<&str>,
    ) -> Self {
        let entry = ModifiedRegistryValue {
            root,
            path: self.substitute(path),
            name: name.to_string(),
            previous_value: self.substitute_opt(previous_value),
            previous_type,
            description: self.substitute_opt(description),
        };
        self.modified_values.push(entry);
        self
    }

    pub fn add_windows_path_entry(mut self, added_entry: &str, description: Option<&str>) -> Self {
        let entry = WindowsPathEntry {
            added_entry: self.substitute(added_entry),
            description: self.substitute_opt(description),
        };
        self.windows_paths.push(entry);
        self
    }

    pub fn add_shell_profile_entry(
        mut self,
        file: &str,
        export_line: &str,
        description: Option<&str>,
    ) -> Self {
        let entry = ShellProfileEntry {
            file: self.substitute(file),
            export_line: self.substitute(export_line),
            description: self.substitute_opt(description),
        };
        self.shell_profiles.push(entry);
        self
    }

    pub fn add_git_bash_profile_entry(
        mut self,
        file: &str,
        export_line: &str,
        description: Option<&str>,
    ) -> Self {
        let entry = GitBashProfileEntry {
            file: self.substitute(file),
            export_line: self.substitute(export_line),
            description: self.substitute_opt(description),
        };
        self.git_bash_profiles.push(entry);
        self
    }

    pub fn add_mcp_server_entry(mut self, config_file: &str, entry_key: &str, tool_name: &str) -> Self {
        let entry = McpServerEntry {
            config_file: self.substitute(config_file),
            entry_key: entry_key.to_string(),
            tool_name: tool_name.to_string(),
        };
        self.mcp_servers.push(entry);
        self
    }

    pub fn add_skill_entry(mut self, path: &str, name: &str) -> Self {
        let entry = SkillEntry {
            path: self.substitute(path),
            name: name.to_string(),
        };
        self.skills.push(entry);
        self
    }

    pub fn add_agent_entry(mut self, path: &str, name: &str) -> Self {
        let entry = AgentEntry {
            path: self.substitute(path),
            name: name.to_string(),
        };
        self.agents.push(entry);
        self
    }

    /// Produce the manifest.
    ///
    /// # Errors
    ///
    /// - [`ManifestError::MissingPackageInfo`] if `with_package_info` was never called
    /// - [`ManifestError::UnresolvedVariable`] if a path still contains `${NAME}`
    pub fn build(self) -> ManifestResult<UninstallManifest> {
        let package = self.package.ok_or(ManifestError::MissingPackageInfo)?;

        let fully_qualified_name = if package.fully_qualified_name.is_empty() {
            fully_qualified_name(&package.name, package.source.as_deref())
        } else {
            package.fully_qualified_name
        };
        let installer_version = self
            .installer_version
            .unwrap_or_else(|| package.version.clone());

        let mut manifest = UninstallManifest::new(PackageInfo {
            name: package.name,
            source: package.source,
            version: package.version,
            fully_qualified_name,
            architecture: package.architecture,
            installed_at: self.installed_at,
            installer_version,
        });
        manifest.files = self.files;
        manifest.directories = self.directories;

        let registry = RegistryInfo {
            created_keys: self.created_keys,
            modified_values: self.modified_values,
        };
        if !registry.is_empty() {
            manifest.registry = Some(registry);
        }

        let path_modifications = PathModifications {
            windows_paths: self.windows_paths,
            shell_profiles: self.shell_profiles,
            git_bash_profiles: self.git_bash_profiles,
        };
        if !path_modifications.is_empty() {
            manifest.path_modifications = Some(path_modifications);
        }

        let ai = AiIntegrations {
            mcp_servers: self.mcp_servers,
            skills: self.skills,
            agents: self.agents,
        };
        if !ai.is_empty() {
            manifest.ai_integrations = Some(ai);
        }

        check_resolved(&manifest)?;
        Ok(manifest)
    }

    fn substitute(&self, input: &str) -> String {
        if !input.contains("${") {
            return input.to_string();
        }
        let mut output = input.to_string();
        for (name, value) in &self.variables {
            output = output.replace(&format!("${{{}}}", name), value);
        }
        output
    }

    fn substitute_opt(&self, input: Option<&str>) -> Option<String> {
        input.map(|s| self.substitute(s))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Reject path-like fields that still carry a placeholder.
///
/// Export lines are skipped: `${PATH}` is valid shell syntax there.
fn check_resolved(manifest: &UninstallManifest) -> ManifestResult<()> {
    let mut fields: Vec<(&'static str, &str)> = Vec::new();
    fields.extend(manifest.files.iter().map(|f| ("file path", f.path.as_str())));
    fields.extend(
        manifest
            .directories
            .iter()
            .map(|d| ("directory path", d.path.as_str())),
    );
    if let Some(registry) = &manifest.registry {
        fields.extend(
            registry
                .created_keys
                .iter()
                .map(|k| ("registry key path", k.path.as_str())),
        );
        fields.extend(
            registry
                .modified_values
                .iter()
                .map(|v| ("registry value path", v.path.as_str())),
        );
    }
    if let Some(path_mods) = &manifest.path_modifications {
        fields.extend(
            path_mods
                .windows_paths
                .iter()
                .map(|w| ("windows path entry", w.added_entry.as_str())),
        );
        fields.extend(
            path_mods
                .shell_profiles
                .iter()
                .map(|s| ("shell profile file", s.file.as_str())),
        );
        fields.extend(
            path_mods
                .git_bash_profiles
                .iter()
                .map(|s| ("git bash profile file", s.file.as_str())),
        );
    }
    if let Some(ai) = &manifest.ai_integrations {
        fields.extend(
            ai.mcp_servers
                .iter()
                .map(|m| ("mcp config file", m.config_file.as_str())),
        );
        fields.extend(ai.skills.iter().map(|s| ("skill path", s.path.as_str())));
        fields.extend(ai.agents.iter().map(|a| ("agent path", a.path.as_str())));
    }

    for (field, value) in fields {
        if let Some(captures) = placeholder_pattern().captures(value) {
            return Err(ManifestError::UnresolvedVariable {
                field,
                variable: captures[0].to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new("/home/me", "/home/me/.jdeploy", "x64")
    }

    fn builder() -> ManifestBuilder {
        ManifestBuilder::new(&layout())
            .with_package_info("my-app", None, "1.0.0", "x64")
            .unwrap()
    }

    #[test]
    fn test_build_without_package_info_fails() {
        let result = ManifestBuilder::new(&layout()).build();
        assert_eq!(result.unwrap_err(), ManifestError::MissingPackageInfo);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let result =
            ManifestBuilder::new(&layout()).with_package_info("", Some("npm"), "1.0", "x64");
        assert_eq!(
            result.unwrap_err(),
            ManifestError::InvalidPackageInfo { field: "name" }
        );
    }

    #[test]
    fn test_path_like_name_is_rejected() {
        let err = ManifestBuilder::new(&layout())
            .with_package_info("..", None, "1.0", "x64")
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidPackageName { .. }), "{:?}", err);
    }

    #[test]
    fn test_empty_version_and_architecture_are_rejected() {
        let err = ManifestBuilder::new(&layout())
            .with_package_info("a", None, "", "x64")
            .unwrap_err();
        assert_eq!(err, ManifestError::InvalidPackageInfo { field: "version" });

        let err = ManifestBuilder::new(&layout())
            .with_package_info("a", None, "1.0", " ")
            .unwrap_err();
        assert_eq!(
            err,
            ManifestError::InvalidPackageInfo {
                field: "architecture"
            }
        );
    }

    #[test]
    fn test_default_variables_are_seeded() {
        let b = builder();
        assert_eq!(b.variable(VAR_USER_HOME), Some("/home/me"));
        assert_eq!(b.variable(VAR_JDEPLOY_HOME), Some("/home/me/.jdeploy"));
        assert_eq!(b.variable(VAR_APP_DIR), Some("/home/me/.jdeploy/apps/my-app"));
    }

    #[test]
    fn test_jdeploy_home_is_substituted() {
        let manifest = builder()
            .add_file("${JDEPLOY_HOME}/bin/my-app", FileType::Script, None)
            .add_directory("${JDEPLOY_HOME}/bin", CleanupStrategy::IfEmpty, None)
            .build()
            .unwrap();
        assert_eq!(manifest.files[0].path, "/home/me/.jdeploy/bin/my-app");
        assert!(!manifest.directories[0].path.contains("${JDEPLOY_HOME}"));
    }

    #[test]
    fn test_substitution_happens_at_add_time() {
        // Rebinding a variable later does not rewrite entries already added.
        let manifest = builder()
            .with_variable("ICON_DIR", "/first")
            .add_file("${ICON_DIR}/app.png", FileType::Icon, None)
            .with_variable("ICON_DIR", "/second")
            .add_file("${ICON_DIR}/app.png", FileType::Icon, None)
            .build()
            .unwrap();
        assert_eq!(manifest.files[0].path, "/first/app.png");
        assert_eq!(manifest.files[1].path, "/second/app.png");
    }

    #[test]
    fn test_unresolved_variable_fails_build() {
        let err = builder()
            .add_file("${UNKNOWN}/x", FileType::Binary, None)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::UnresolvedVariable { ref variable, .. } if variable == "${UNKNOWN}"
        ));
    }

    #[test]
    fn test_export_line_may_keep_shell_variables() {
        let manifest = builder()
            .add_shell_profile_entry(
                "${USER_HOME}/.bashrc",
                "export PATH=\"${APP_DIR}/bin:${PATH}\"",
                None,
            )
            .build()
            .unwrap();
        let entry = &manifest.path_modifications.unwrap().shell_profiles[0];
        assert_eq!(entry.file, "/home/me/.bashrc");
        assert_eq!(
            entry.export_line,
            "export PATH=\"/home/me/.jdeploy/apps/my-app/bin:${PATH}\""
        );
    }

    #[test]
    fn test_installer_version_defaults_to_package_version() {
        let manifest = builder().build().unwrap();
        assert_eq!(manifest.package_info.installer_version, "1.0.0");

        let manifest = builder().with_installer_version("5.1").build().unwrap();
        assert_eq!(manifest.package_info.installer_version, "5.1");
    }

    #[test]
    fn test_optional_groups_absent_when_unused() {
        let manifest = builder().build().unwrap();
        assert!(manifest.registry.is_none());
        assert!(manifest.path_modifications.is_none());
        assert!(manifest.ai_integrations.is_none());
    }

    #[test]
    fn test_registry_group_present_when_used() {
        let manifest = builder()
            .add_modified_registry_value(
                RegistryRoot::CurrentUser,
                "Software\\Classes\\.txt",
                "",
                None,
                RegistryValueType::String,
                None,
            )
            .build()
            .unwrap();
        let registry = manifest.registry.unwrap();
        assert!(registry.created_keys.is_empty());
        assert_eq!(registry.modified_values[0].previous_value, None);
    }

    #[test]
    fn test_github_source_sets_hashed_fqn_and_app_dir() {
        let b = ManifestBuilder::new(&layout())
            .with_package_info("app", Some("abc"), "1.0", "arm64")
            .unwrap();
        assert_eq!(
            b.variable(VAR_APP_DIR),
            Some("/home/me/.jdeploy/apps/900150983cd24fb0d6963f7d28e17f72.app")
        );
        let manifest = b.build().unwrap();
        assert_eq!(
            manifest.package_info.fully_qualified_name,
            "900150983cd24fb0d6963f7d28e17f72.app"
        );
        assert_eq!(manifest.package_info.source.as_deref(), Some("abc"));
    }

    #[test]
    fn test_win_app_dir_rebinds_app_dir() {
        let manifest = builder()
            .with_win_app_dir("AppData/Local/Programs")
            .add_directory("${APP_DIR}", CleanupStrategy::Always, None)
            .build()
            .unwrap();
        assert_eq!(
            manifest.directories[0].path,
            "/home/me/AppData/Local/Programs/my-app"
        );
    }

    #[test]
    fn test_win_app_dir_before_package_info_is_ignored() {
        let b = ManifestBuilder::new(&layout()).with_win_app_dir("Programs");
        assert_eq!(b.variable(VAR_APP_DIR), None);
    }

    #[test]
    fn test_ai_entries_substitute_paths_only() {
        let manifest = builder()
            .add_mcp_server_entry("${USER_HOME}/.claude.json", "${APP_DIR}", "CLAUDE_CODE")
            .add_skill_entry("${USER_HOME}/.claude/skills/my-app", "my-app")
            .build()
            .unwrap();
        let ai = manifest.ai_integrations.unwrap();
        assert_eq!(ai.mcp_servers[0].config_file, "/home/me/.claude.json");
        assert_eq!(ai.mcp_servers[0].entry_key, "${APP_DIR}");
        assert_eq!(ai.skills[0].path, "/home/me/.claude/skills/my-app");
    }
}
