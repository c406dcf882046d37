//! Subcommand implementations.

pub mod path;
pub mod show;
pub mod uninstall;
pub mod validate;

use clap::Args;
use jdeploy_uninstall::manifest::check_package_name;
use jdeploy_uninstall::{FileManifestRepository, UninstallConfig};

/// Identifies an installed package.
#[derive(Debug, Clone, Args)]
pub struct PackageArgs {
    /// Package name as published (npm name or repository name)
    #[arg(value_parser = parse_package_name)]
    pub name: String,

    /// Source URL for packages published on GitHub
    #[arg(long, value_name = "URL")]
    pub source: Option<String>,
}

impl PackageArgs {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }
}

fn parse_package_name(name: &str) -> Result<String, String> {
    check_package_name(name)
        .map(|()| name.to_string())
        .map_err(|e| e.to_string())
}

/// Repository rooted at the configured jDeploy home.
pub fn repository(config: &UninstallConfig) -> FileManifestRepository {
    FileManifestRepository::new(config.layout(), config.validation)
}
