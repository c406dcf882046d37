//! Show command - summarise a stored manifest.

use console::style;
use jdeploy_uninstall::{ManifestRepository, UninstallConfig, UninstallManifest};

use super::{repository, PackageArgs};
use crate::error::CliError;

pub fn run(args: PackageArgs, config: &UninstallConfig) -> Result<(), CliError> {
    let repo = repository(config);
    let manifest = repo.load(&args.name, args.source())?.ok_or_else(|| {
        CliError::NotFound(format!(
            "No uninstall manifest found for {} at {}",
            args.name,
            repo.manifest_path(&args.name, args.source()).display()
        ))
    })?;

    print_manifest(&manifest);
    Ok(())
}

fn print_manifest(manifest: &UninstallManifest) {
    let info = &manifest.package_info;
    println!("{} {}", style(&info.name).bold(), info.version);
    println!("  Source:        {}", info.source.as_deref().unwrap_or("npm"));
    println!("  Identifier:    {}", info.fully_qualified_name);
    println!("  Architecture:  {}", info.architecture);
    println!("  Installed at:  {}", info.installed_at.to_rfc3339());
    println!("  Installer:     {}", info.installer_version);
    println!();

    println!("{}", style("Recorded entries").underlined());
    println!("  Files:         {}", manifest.files.len());
    println!("  Directories:   {}", manifest.directories.len());

    if let Some(registry) = &manifest.registry {
        println!("  Registry keys: {}", registry.created_keys.len());
        println!("  Registry values: {}", registry.modified_values.len());
    }
    if let Some(paths) = &manifest.path_modifications {
        println!("  Windows PATH:  {}", paths.windows_paths.len());
        println!("  Shell profiles: {}", paths.shell_profiles.len());
        println!("  Git Bash profiles: {}", paths.git_bash_profiles.len());
    }
    if let Some(ai) = &manifest.ai_integrations {
        println!("  MCP servers:   {}", ai.mcp_servers.len());
        println!("  Skills:        {}", ai.skills.len());
        println!("  Agents:        {}", ai.agents.len());
    }
}
