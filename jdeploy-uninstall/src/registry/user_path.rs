//! The per-user Windows `PATH` stored under `HKCU\Environment`.

use tracing::debug;

use super::error::RegistryResult;
use super::value::RegistryValue;
use super::RegistryOperations;
use crate::manifest::RegistryRoot;

/// Key holding per-user environment variables.
pub const ENVIRONMENT_KEY: &str = "Environment";

/// Value name of the user `PATH`.
pub const PATH_VALUE_NAME: &str = "Path";

/// Remove every occurrence of `entry` from the user `PATH`.
///
/// Entries compare case-insensitively and ignore a trailing `\`. The value
/// is rewritten only when something was removed, keeping its original type.
/// Returns whether the value changed.
pub fn remove_from_user_path(registry: &dyn RegistryOperations, entry: &str) -> RegistryResult<bool> {
    let root = RegistryRoot::CurrentUser;
    let current = match registry.get_value(root, ENVIRONMENT_KEY, PATH_VALUE_NAME)? {
        Some(value) => value,
        None => return Ok(false),
    };
    let text = match current.as_str() {
        Some(text) => text.to_string(),
        None => return Ok(false),
    };

    let wanted = comparable(entry);
    if wanted.is_empty() {
        return Ok(false);
    }

    let kept: Vec<&str> = text
        .split(';')
        .filter(|part| comparable(part) != wanted)
        .collect();
    let before = text.split(';').count();
    if kept.len() == before {
        return Ok(false);
    }

    let removed = before - kept.len();
    let updated = kept.join(";");
    let value = match current {
        RegistryValue::String(_) => RegistryValue::String(updated),
        _ => RegistryValue::ExpandString(updated),
    };
    registry.set_value(root, ENVIRONMENT_KEY, PATH_VALUE_NAME, &value)?;
    debug!(entry, removed, "Updated user PATH");
    Ok(true)
}

fn comparable(entry: &str) -> String {
    entry.trim().trim_end_matches('\\').to_lowercase()
}
