//! Path command - print where a package's manifest lives.

use jdeploy_uninstall::UninstallConfig;

use super::PackageArgs;
use crate::error::CliError;

pub fn run(args: PackageArgs, config: &UninstallConfig) -> Result<(), CliError> {
    let path = config.layout().manifest_path(&args.name, args.source());
    println!("{}", path.display());
    Ok(())
}
