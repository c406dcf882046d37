//! Uninstall command - run the phase pipeline for one package.

use clap::Args;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use jdeploy_uninstall::{ManifestRepository, UninstallConfig, UninstallResult, UninstallService};
use tracing::info;

use super::{repository, PackageArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub package: PackageArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: UninstallArgs, config: &UninstallConfig) -> Result<(), CliError> {
    let name = args.package.name.as_str();
    let source = args.package.source();
    let repo = repository(config);

    if !args.yes && !confirm(&repo, name, source)? {
        println!("Uninstall cancelled.");
        return Ok(());
    }

    info!(package = name, source = source.unwrap_or("npm"), "Starting uninstall");
    let service = UninstallService::for_current_platform(repo, config.layout());
    let result = service.uninstall(name, source);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(name, &result);
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            failures: result.failure_count(),
        })
    }
}

fn confirm(
    repo: &impl ManifestRepository,
    name: &str,
    source: Option<&str>,
) -> Result<bool, CliError> {
    let prompt = match repo.load(name, source) {
        Ok(Some(manifest)) => format!(
            "Uninstall {} {} ({} recorded entries)?",
            name,
            manifest.package_info.version,
            manifest.entry_count()
        ),
        // The pipeline still cleans package directories without a manifest.
        _ => format!("No readable manifest for {}. Remove its package directories?", name),
    };

    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn print_result(name: &str, result: &UninstallResult) {
    if result.is_success() {
        println!(
            "{} Uninstalled {} ({})",
            style("✓").green().bold(),
            style(name).bold(),
            result
        );
        return;
    }

    println!(
        "{} Uninstalled {} with errors ({})",
        style("!").yellow().bold(),
        style(name).bold(),
        result
    );
    for error in result.errors() {
        println!("  {} {}", style("✗").red(), error);
    }
}
