//! Registry access capability.
//!
//! The uninstall pipeline talks to the registry only through
//! [`RegistryOperations`]. On Windows the capability is backed by the Win32
//! registry API; elsewhere the registry phases are skipped, and tests inject
//! an [`InMemoryRegistry`].
//!
//! Key paths are relative to a [`RegistryRoot`] and use `\` as separator,
//! e.g. `Software\Clients\StartMenuInternet\my-app`.

mod error;
mod memory;
mod user_path;
mod value;
#[cfg(windows)]
mod windows;

pub use error::{RegistryError, RegistryResult};
pub use memory::InMemoryRegistry;
pub use user_path::{remove_from_user_path, ENVIRONMENT_KEY, PATH_VALUE_NAME};
pub use value::RegistryValue;
#[cfg(windows)]
pub use windows::WindowsRegistry;

use std::sync::Arc;

use crate::manifest::RegistryRoot;

/// Operations needed to reverse registry side effects.
///
/// Implementations must be usable behind `&self`; the pipeline holds the
/// capability as a shared trait object.
pub trait RegistryOperations: Send + Sync {
    fn key_exists(&self, root: RegistryRoot, key: &str) -> RegistryResult<bool>;

    /// Create a key and any missing ancestors. Existing keys are left alone.
    fn create_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()>;

    /// Delete a single key. Fails when the key still has subkeys.
    fn delete_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()>;

    /// Read a value. `Ok(None)` when the key or value does not exist.
    fn get_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
    ) -> RegistryResult<Option<RegistryValue>>;

    /// Write a value into an existing key.
    fn set_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
        value: &RegistryValue,
    ) -> RegistryResult<()>;

    fn delete_value(&self, root: RegistryRoot, key: &str, name: &str) -> RegistryResult<()>;

    /// Names of the direct subkeys.
    fn subkeys(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>>;

    fn value_names(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>>;

    fn value_exists(&self, root: RegistryRoot, key: &str, name: &str) -> RegistryResult<bool> {
        Ok(self.get_value(root, key, name)?.is_some())
    }

    /// Read a `REG_SZ` or `REG_EXPAND_SZ` value.
    fn get_string_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
    ) -> RegistryResult<Option<String>> {
        Ok(self
            .get_value(root, key, name)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    fn set_string_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
        value: &str,
    ) -> RegistryResult<()> {
        self.set_value(root, key, name, &RegistryValue::String(value.to_string()))
    }
}

/// Shared capability, e.g. an [`InMemoryRegistry`] a test inspects after
/// handing it to the pipeline.
impl<T: RegistryOperations + ?Sized> RegistryOperations for Arc<T> {
    fn key_exists(&self, root: RegistryRoot, key: &str) -> RegistryResult<bool> {
        (**self).key_exists(root, key)
    }

    fn create_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()> {
        (**self).create_key(root, key)
    }

    fn delete_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()> {
        (**self).delete_key(root, key)
    }

    fn get_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
    ) -> RegistryResult<Option<RegistryValue>> {
        (**self).get_value(root, key, name)
    }

    fn set_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
        value: &RegistryValue,
    ) -> RegistryResult<()> {
        (**self).set_value(root, key, name, value)
    }

    fn delete_value(&self, root: RegistryRoot, key: &str, name: &str) -> RegistryResult<()> {
        (**self).delete_value(root, key, name)
    }

    fn subkeys(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>> {
        (**self).subkeys(root, key)
    }

    fn value_names(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>> {
        (**self).value_names(root, key)
    }
}

/// Registry capability for the running host, `None` where there is no
/// registry.
pub fn system_registry() -> Option<Box<dyn RegistryOperations>> {
    #[cfg(windows)]
    {
        Some(Box::new(WindowsRegistry::new()))
    }
    #[cfg(not(windows))]
    {
        None
    }
}

/// Delete a key with all of its subkeys and values.
///
/// Returns `false` when the key did not exist.
pub fn delete_key_recursive(
    registry: &dyn RegistryOperations,
    root: RegistryRoot,
    key: &str,
) -> RegistryResult<bool> {
    let key = normalize_key(key);
    if key.is_empty() || !registry.key_exists(root, &key)? {
        return Ok(false);
    }
    for subkey in registry.subkeys(root, &key)? {
        delete_key_recursive(registry, root, &format!("{}\\{}", key, subkey))?;
    }
    for name in registry.value_names(root, &key)? {
        registry.delete_value(root, &key, &name)?;
    }
    registry.delete_key(root, &key)?;
    Ok(true)
}

/// Trim separators and collapse empty segments: `\A\\B\` becomes `A\B`.
pub(crate) fn normalize_key(key: &str) -> String {
    key.split(['\\', '/'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
}
