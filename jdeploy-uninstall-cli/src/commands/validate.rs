//! Validate command - check a manifest file against the schema rules.

use std::path::PathBuf;

use clap::Args;
use console::style;
use jdeploy_uninstall::{FileManifestRepository, UninstallConfig, ValidationMode};

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Manifest file to check
    pub file: PathBuf,

    /// Run only the structural checks, skipping the schema rules
    #[arg(long)]
    pub relaxed: bool,
}

pub fn run(args: ValidateArgs, config: &UninstallConfig) -> Result<(), CliError> {
    let mode = if args.relaxed {
        ValidationMode::Relaxed
    } else {
        config.validation
    };
    let repo = FileManifestRepository::new(config.layout(), mode);
    let manifest = repo.load_file(&args.file)?;

    println!(
        "{} {} is valid ({} {}, {} entries)",
        style("✓").green().bold(),
        args.file.display(),
        manifest.package_info.name,
        manifest.package_info.version,
        manifest.entry_count()
    );
    Ok(())
}
