//! The phased uninstall pipeline.

use std::cmp::Reverse;
use std::path::Path;

use tracing::{debug, info, info_span, warn};

use super::ai::remove_mcp_server;
use super::filesystem::{cleanup_directory, remove_path, Removal};
use super::phase::UninstallPhase;
use super::profile::{ProfileEditor, ProfileKind};
use super::result::UninstallResult;
use crate::layout::Layout;
use crate::manifest::{
    check_package_name, AiIntegrations, InstalledDirectory, InstalledFile, PathModifications, RegistryInfo,
    UninstallManifest,
};
use crate::platform::OsFamily;
use crate::registry::{
    self, delete_key_recursive, remove_from_user_path, RegistryOperations, RegistryValue,
};
use crate::store::ManifestRepository;

/// Reverses the side effects recorded in a package's uninstall manifest.
///
/// Phases run in a fixed order and never abort each other: a failure is
/// recorded in the [`UninstallResult`] and the pipeline moves on. Targets
/// that are already gone count as successes.
///
/// There is no cross-process locking. Callers must not install and
/// uninstall the same package concurrently.
pub struct UninstallService<R: ManifestRepository> {
    repository: R,
    layout: Layout,
    registry: Option<Box<dyn RegistryOperations>>,
    profiles: ProfileEditor,
}

impl<R: ManifestRepository> UninstallService<R> {
    pub fn new(
        repository: R,
        layout: Layout,
        registry: Option<Box<dyn RegistryOperations>>,
    ) -> Self {
        let profiles = ProfileEditor::new(layout.home_dir());
        Self {
            repository,
            layout,
            registry,
            profiles,
        }
    }

    /// Registry phases enabled only where the host has a registry.
    pub fn for_current_platform(repository: R, layout: Layout) -> Self {
        let registry = if OsFamily::current().has_registry() {
            registry::system_registry()
        } else {
            None
        };
        Self::new(repository, layout, registry)
    }

    pub fn with_registry(
        repository: R,
        layout: Layout,
        registry: Box<dyn RegistryOperations>,
    ) -> Self {
        Self::new(repository, layout, Some(registry))
    }

    pub fn without_registry(repository: R, layout: Layout) -> Self {
        Self::new(repository, layout, None)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn has_registry(&self) -> bool {
        self.registry.is_some()
    }

    /// Uninstall a package identified by name and optional source URL.
    ///
    /// A name that would resolve outside the package's own directories is
    /// recorded as a single failure and no phase runs.
    pub fn uninstall(&self, package_name: &str, source: Option<&str>) -> UninstallResult {
        let span = info_span!("uninstall", package = package_name, source = source.unwrap_or(""));
        let _enter = span.enter();
        info!("Starting uninstall");

        let mut result = UninstallResult::new();

        if let Err(e) = check_package_name(package_name) {
            let message = format!("Refusing to uninstall: {}", e);
            warn!("{}", message);
            result.record_failure(message);
            return result;
        }

        let manifest = self.run(UninstallPhase::LoadManifest, &mut result, |_| {
            self.load_manifest(package_name, source)
        });

        if let Some(manifest) = &manifest {
            self.run(UninstallPhase::Files, &mut result, |r| {
                self.remove_files(&manifest.files, r)
            });
            self.run(UninstallPhase::Directories, &mut result, |r| {
                self.cleanup_directories(&manifest.directories, r)
            });
            self.run(UninstallPhase::Registry, &mut result, |r| {
                if let Some(registry_info) = &manifest.registry {
                    self.cleanup_registry(registry_info, r)
                }
            });
            self.run(UninstallPhase::PathModifications, &mut result, |r| {
                if let Some(path_mods) = &manifest.path_modifications {
                    self.cleanup_path_modifications(path_mods, r)
                }
            });
            self.run(UninstallPhase::AiIntegrations, &mut result, |r| {
                if let Some(ai) = &manifest.ai_integrations {
                    self.cleanup_ai_integrations(ai, r)
                }
            });
        }

        self.run(UninstallPhase::PackageDirectories, &mut result, |r| {
            self.cleanup_package_directories(package_name, source, r)
        });
        self.run(UninstallPhase::SelfCleanup, &mut result, |r| {
            self.self_cleanup(package_name, source, r)
        });

        if result.is_success() {
            info!(succeeded = result.success_count(), "Uninstall complete");
        } else {
            warn!(
                succeeded = result.success_count(),
                failed = result.failure_count(),
                "Uninstall finished with errors"
            );
        }
        result
    }

    fn run<T>(
        &self,
        phase: UninstallPhase,
        result: &mut UninstallResult,
        body: impl FnOnce(&mut UninstallResult) -> T,
    ) -> T {
        let span = info_span!("phase", name = phase.name());
        let _enter = span.enter();
        let (ok_before, failed_before) = (result.success_count(), result.failure_count());
        let output = body(result);
        debug!(
            succeeded = result.success_count() - ok_before,
            failed = result.failure_count() - failed_before,
            "Phase finished"
        );
        output
    }

    fn load_manifest(&self, package_name: &str, source: Option<&str>) -> Option<UninstallManifest> {
        match self.repository.load(package_name, source) {
            Ok(Some(manifest)) => {
                debug!(entries = manifest.entry_count(), "Loaded uninstall manifest");
                Some(manifest)
            }
            Ok(None) => {
                warn!("No uninstall manifest found; removing package directories only");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not load uninstall manifest; removing package directories only");
                None
            }
        }
    }

    fn remove_files(&self, files: &[InstalledFile], result: &mut UninstallResult) {
        for file in files {
            match remove_path(Path::new(&file.path)) {
                Ok(Removal::Missing) => {
                    debug!(path = %file.path, "File already removed");
                    result.record_success();
                }
                Ok(_) => {
                    debug!(path = %file.path, kind = %file.file_type, "Deleted file");
                    result.record_success();
                }
                Err(e) => {
                    let message = format!("Failed to delete file: {} - {}", file.path, e);
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }
    }

    /// Deepest paths first, so `ifEmpty` parents see their children gone.
    fn cleanup_directories(&self, directories: &[InstalledDirectory], result: &mut UninstallResult) {
        let mut ordered: Vec<&InstalledDirectory> = directories.iter().collect();
        ordered.sort_by_key(|d| Reverse(Path::new(&d.path).components().count()));

        for dir in ordered {
            match cleanup_directory(Path::new(&dir.path), dir.cleanup) {
                Ok(outcome) => {
                    debug!(path = %dir.path, strategy = %dir.cleanup, ?outcome, "Directory cleaned up");
                    result.record_success();
                }
                Err(e) => {
                    let message = format!("Failed to clean up directory: {} - {}", dir.path, e);
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }
    }

    fn cleanup_registry(&self, info: &RegistryInfo, result: &mut UninstallResult) {
        let registry = match &self.registry {
            Some(registry) => registry.as_ref(),
            None => {
                debug!("No registry on this platform; skipping registry cleanup");
                return;
            }
        };

        for key in info.created_keys.iter().rev() {
            match delete_key_recursive(registry, key.root, &key.path) {
                Ok(existed) => {
                    debug!(root = %key.root, key = %key.path, existed, "Registry key removed");
                    result.record_success();
                }
                Err(e) => {
                    let message =
                        format!("Failed to delete registry key: {}\\{} - {}", key.root, key.path, e);
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }

        for value in &info.modified_values {
            let outcome = match &value.previous_value {
                Some(previous) => {
                    RegistryValue::from_recorded(previous, value.previous_type).and_then(|restored| {
                        if !registry.key_exists(value.root, &value.path)? {
                            registry.create_key(value.root, &value.path)?;
                        }
                        registry.set_value(value.root, &value.path, &value.name, &restored)
                    })
                }
                None => registry
                    .value_exists(value.root, &value.path, &value.name)
                    .and_then(|exists| {
                        if exists {
                            registry.delete_value(value.root, &value.path, &value.name)
                        } else {
                            Ok(())
                        }
                    }),
            };

            match outcome {
                Ok(()) => {
                    debug!(key = %value.path, name = %value.name, restored = value.previous_value.is_some(), "Registry value reverted");
                    result.record_success();
                }
                Err(e) => {
                    let message = format!(
                        "Failed to restore/delete registry value: {}\\{} \\ {} - {}",
                        value.root, value.path, value.name, e
                    );
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }
    }

    fn cleanup_path_modifications(&self, mods: &PathModifications, result: &mut UninstallResult) {
        match &self.registry {
            Some(registry) => {
                for entry in &mods.windows_paths {
                    match remove_from_user_path(registry.as_ref(), &entry.added_entry) {
                        Ok(changed) => {
                            debug!(entry = %entry.added_entry, changed, "Windows PATH entry removed");
                            result.record_success();
                        }
                        Err(e) => {
                            let message = format!(
                                "Failed to remove from Windows PATH: {} - {}",
                                entry.added_entry, e
                            );
                            warn!("{}", message);
                            result.record_failure(message);
                        }
                    }
                }
            }
            None if !mods.windows_paths.is_empty() => {
                debug!("No registry on this platform; skipping Windows PATH cleanup");
            }
            None => {}
        }

        let shell = mods
            .shell_profiles
            .iter()
            .map(|e| (e.file.as_str(), e.export_line.as_str(), ProfileKind::Shell));
        let git_bash = mods
            .git_bash_profiles
            .iter()
            .map(|e| (e.file.as_str(), e.export_line.as_str(), ProfileKind::GitBash));

        for (file, line, kind) in shell.chain(git_bash) {
            match self.profiles.remove_line(Path::new(file), line, kind) {
                Ok(changed) => {
                    debug!(file, changed, ?kind, "Profile PATH line removed");
                    result.record_success();
                }
                Err(e) => {
                    let label = match kind {
                        ProfileKind::Shell => "shell profile",
                        ProfileKind::GitBash => "Git Bash profile",
                    };
                    let message = format!("Failed to remove from {}: {} - {}", label, file, e);
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }
    }

    fn cleanup_ai_integrations(&self, ai: &AiIntegrations, result: &mut UninstallResult) {
        for server in &ai.mcp_servers {
            match remove_mcp_server(Path::new(&server.config_file), &server.entry_key, &server.tool_name) {
                Ok(changed) => {
                    debug!(entry = %server.entry_key, tool = %server.tool_name, changed, "MCP server entry removed");
                    result.record_success();
                }
                Err(e) => {
                    let message = format!(
                        "Failed to remove MCP server entry: {} - {}",
                        server.entry_key, e
                    );
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }

        let skills = ai.skills.iter().map(|s| ("skill", s.path.as_str()));
        let agents = ai.agents.iter().map(|a| ("agent", a.path.as_str()));
        for (kind, path) in skills.chain(agents) {
            match remove_path(Path::new(path)) {
                Ok(outcome) => {
                    debug!(kind, path, ?outcome, "AI integration directory removed");
                    result.record_success();
                }
                Err(e) => {
                    let message = format!("Failed to delete {} directory: {} - {}", kind, path, e);
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }
    }

    /// Directories owned by the package whether or not a manifest named them.
    /// Absent directories are not counted.
    fn cleanup_package_directories(
        &self,
        package_name: &str,
        source: Option<&str>,
        result: &mut UninstallResult,
    ) {
        for dir in self.layout.owned_dirs(package_name, source) {
            match remove_path(&dir) {
                Ok(Removal::Missing) => {}
                Ok(_) => {
                    info!(path = %dir.display(), "Removed package directory");
                    result.record_success();
                }
                Err(e) => {
                    let message =
                        format!("Failed to delete package directory: {} - {}", dir.display(), e);
                    warn!("{}", message);
                    result.record_failure(message);
                }
            }
        }
    }

    fn self_cleanup(&self, package_name: &str, source: Option<&str>, result: &mut UninstallResult) {
        match self.repository.delete(package_name, source) {
            Ok(true) => {
                debug!("Deleted uninstall manifest");
                result.record_success();
            }
            Ok(false) => {}
            Err(e) => {
                let message = format!("Failed to delete uninstall manifest: {}", e);
                warn!("{}", message);
                result.record_failure(message);
            }
        }
    }
}
