//! jdeploy-uninstall - remove applications installed by jDeploy
//!
//! Thin front end over the `jdeploy_uninstall` library: resolves
//! configuration, installs logging and dispatches to a subcommand.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use jdeploy_uninstall::logging::{self, LoggingGuard};
use jdeploy_uninstall::UninstallConfig;

use crate::error::{CliError, EXIT_SUCCESS};

#[derive(Debug, Parser)]
#[command(name = "jdeploy-uninstall", version, about = "Remove applications installed by jDeploy")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the jDeploy home directory (default: ~/.jdeploy or $JDEPLOY_HOME)
    #[arg(long, global = true, value_name = "DIR")]
    jdeploy_home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Uninstall a package and everything its manifest recorded
    Uninstall(commands::uninstall::UninstallArgs),

    /// Summarise the stored manifest of a package
    Show(commands::PackageArgs),

    /// Validate a manifest file
    Validate(commands::validate::ValidateArgs),

    /// Print the canonical manifest path of a package
    Path(commands::PackageArgs),
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let _guard = init_logging(&config, &cli.command)?;

    match cli.command {
        Commands::Uninstall(args) => commands::uninstall::run(args, &config),
        Commands::Show(args) => commands::show::run(args, &config),
        Commands::Validate(args) => commands::validate::run(args, &config),
        Commands::Path(args) => commands::path::run(args, &config),
    }
}

fn load_config(cli: &Cli) -> Result<UninstallConfig, CliError> {
    let config = match &cli.jdeploy_home {
        Some(jdeploy_home) => {
            let home = dirs::home_dir()
                .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
            UninstallConfig::load_from(home, Some(jdeploy_home.clone()))?
        }
        None => UninstallConfig::load()?,
    };
    Ok(if cli.verbose {
        config.with_log_level("debug")
    } else {
        config
    })
}

/// Only `uninstall` changes anything, so only it writes the log file.
fn init_logging(config: &UninstallConfig, command: &Commands) -> Result<LoggingGuard, CliError> {
    let log_file = match command {
        Commands::Uninstall(_) => config.log_file(),
        _ => None,
    };
    Ok(logging::init_logging(&config.log_level, log_file.as_deref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_uninstall_with_source() {
        let cli = Cli::try_parse_from([
            "jdeploy-uninstall",
            "--verbose",
            "uninstall",
            "my-app",
            "--source",
            "https://github.com/owner/my-app",
            "--yes",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Uninstall(args) => {
                assert_eq!(args.package.name, "my-app");
                assert_eq!(
                    args.package.source.as_deref(),
                    Some("https://github.com/owner/my-app")
                );
                assert!(args.yes);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validate_requires_file() {
        assert!(Cli::try_parse_from(["jdeploy-uninstall", "validate"]).is_err());
    }

    #[test]
    fn test_package_name_must_stay_inside_its_directory() {
        for name in ["", "..", "../other"] {
            assert!(
                Cli::try_parse_from(["jdeploy-uninstall", "uninstall", name, "--yes"]).is_err(),
                "{:?}",
                name
            );
        }
        assert!(Cli::try_parse_from(["jdeploy-uninstall", "show", "@acme/tool"]).is_ok());
    }
}
