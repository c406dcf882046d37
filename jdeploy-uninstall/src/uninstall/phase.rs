//! Pipeline phases, in execution order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UninstallPhase {
    LoadManifest,
    Files,
    Directories,
    Registry,
    PathModifications,
    AiIntegrations,
    PackageDirectories,
    SelfCleanup,
}

impl UninstallPhase {
    /// Every phase in the order the pipeline runs them.
    pub const ALL: [UninstallPhase; 8] = [
        UninstallPhase::LoadManifest,
        UninstallPhase::Files,
        UninstallPhase::Directories,
        UninstallPhase::Registry,
        UninstallPhase::PathModifications,
        UninstallPhase::AiIntegrations,
        UninstallPhase::PackageDirectories,
        UninstallPhase::SelfCleanup,
    ];

    /// Name used for tracing spans.
    pub fn name(&self) -> &'static str {
        match self {
            UninstallPhase::LoadManifest => "load_manifest",
            UninstallPhase::Files => "files",
            UninstallPhase::Directories => "directories",
            UninstallPhase::Registry => "registry",
            UninstallPhase::PathModifications => "path_modifications",
            UninstallPhase::AiIntegrations => "ai_integrations",
            UninstallPhase::PackageDirectories => "package_directories",
            UninstallPhase::SelfCleanup => "self_cleanup",
        }
    }
}

impl fmt::Display for UninstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
