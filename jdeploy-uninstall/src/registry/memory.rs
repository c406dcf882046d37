//! In-memory registry used on non-Windows hosts and in tests.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use super::error::{RegistryError, RegistryResult};
use super::value::RegistryValue;
use super::{normalize_key, RegistryOperations};
use crate::manifest::RegistryRoot;

#[derive(Debug, Default, Clone)]
struct KeyData {
    /// Path as first created, for reporting subkey names.
    path: String,
    /// Lower-cased value name -> (original name, value).
    values: BTreeMap<String, (String, RegistryValue)>,
}

/// Registry emulation with Windows semantics: case-insensitive key and value
/// names, and non-recursive key deletion that refuses keys with subkeys.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    keys: Mutex<HashMap<(RegistryRoot, String), KeyData>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys across both roots.
    pub fn key_count(&self) -> usize {
        self.keys.lock().len()
    }

    fn lookup(key: &str) -> String {
        normalize_key(key).to_lowercase()
    }

    fn not_found(root: RegistryRoot, key: &str) -> RegistryError {
        RegistryError::KeyNotFound {
            root,
            key: key.to_string(),
        }
    }
}

impl RegistryOperations for InMemoryRegistry {
    fn key_exists(&self, root: RegistryRoot, key: &str) -> RegistryResult<bool> {
        Ok(self.keys.lock().contains_key(&(root, Self::lookup(key))))
    }

    fn create_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()> {
        let normalized = normalize_key(key);
        let mut keys = self.keys.lock();
        let mut current = String::new();
        for segment in normalized.split('\\').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('\\');
            }
            current.push_str(segment);
            keys.entry((root, current.to_lowercase()))
                .or_insert_with(|| KeyData {
                    path: current.clone(),
                    values: BTreeMap::new(),
                });
        }
        Ok(())
    }

    fn delete_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()> {
        let lookup = Self::lookup(key);
        let mut keys = self.keys.lock();
        if !keys.contains_key(&(root, lookup.clone())) {
            return Err(Self::not_found(root, key));
        }
        let prefix = format!("{}\\", lookup);
        if keys
            .keys()
            .any(|(r, k)| *r == root && k.starts_with(&prefix))
        {
            return Err(RegistryError::HasSubkeys {
                root,
                key: key.to_string(),
            });
        }
        keys.remove(&(root, lookup));
        Ok(())
    }

    fn get_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
    ) -> RegistryResult<Option<RegistryValue>> {
        let keys = self.keys.lock();
        Ok(keys
            .get(&(root, Self::lookup(key)))
            .and_then(|data| data.values.get(&name.to_lowercase()))
            .map(|(_, value)| value.clone()))
    }

    fn set_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
        value: &RegistryValue,
    ) -> RegistryResult<()> {
        let mut keys = self.keys.lock();
        let data = keys
            .get_mut(&(root, Self::lookup(key)))
            .ok_or_else(|| Self::not_found(root, key))?;
        data.values
            .insert(name.to_lowercase(), (name.to_string(), value.clone()));
        Ok(())
    }

    fn delete_value(&self, root: RegistryRoot, key: &str, name: &str) -> RegistryResult<()> {
        let mut keys = self.keys.lock();
        let data = keys
            .get_mut(&(root, Self::lookup(key)))
            .ok_or_else(|| Self::not_found(root, key))?;
        match data.values.remove(&name.to_lowercase()) {
            Some(_) => Ok(()),
            None => Err(RegistryError::ValueNotFound {
                root,
                key: key.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn subkeys(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>> {
        let lookup = Self::lookup(key);
        let keys = self.keys.lock();
        if !keys.contains_key(&(root, lookup.clone())) {
            return Err(Self::not_found(root, key));
        }
        let prefix = format!("{}\\", lookup);
        let mut names: Vec<String> = keys
            .iter()
            .filter(|((r, k), _)| *r == root && k.starts_with(&prefix))
            .filter(|((_, k), _)| !k[prefix.len()..].contains('\\'))
            .filter_map(|(_, data)| data.path.rsplit('\\').next().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn value_names(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>> {
        let keys = self.keys.lock();
        let data = keys
            .get(&(root, Self::lookup(key)))
            .ok_or_else(|| Self::not_found(root, key))?;
        Ok(data.values.values().map(|(name, _)| name.clone()).collect())
    }
}
