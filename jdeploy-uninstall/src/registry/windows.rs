//! Win32 registry backend.

use std::ffi::OsStr;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{
    ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS, WIN32_ERROR,
};
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegDeleteKeyW, RegDeleteValueW, RegEnumKeyExW, RegEnumValueW,
    RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY, HKEY_CURRENT_USER,
    HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE, REG_BINARY, REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ,
    REG_OPTION_NON_VOLATILE, REG_QWORD, REG_SAM_FLAGS, REG_SZ, REG_VALUE_TYPE,
};

use super::error::{RegistryError, RegistryResult};
use super::value::RegistryValue;
use super::{normalize_key, RegistryOperations};
use crate::manifest::RegistryRoot;

/// Longest key name the registry allows, plus the terminator.
const MAX_KEY_NAME: usize = 256;

/// Longest value name the registry allows, plus the terminator.
const MAX_VALUE_NAME: usize = 16_384;

trait WideString {
    fn to_wide(&self) -> Vec<u16>;
}

impl WideString for &str {
    fn to_wide(&self) -> Vec<u16> {
        OsStr::new(self).encode_wide().chain(once(0)).collect()
    }
}

/// Handle closed on drop.
struct OpenKey(HKEY);

impl Drop for OpenKey {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// [`RegistryOperations`] over the live Windows registry.
#[derive(Debug, Default)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    pub fn new() -> Self {
        Self
    }

    fn hive(root: RegistryRoot) -> HKEY {
        match root {
            RegistryRoot::CurrentUser => HKEY_CURRENT_USER,
            RegistryRoot::LocalMachine => HKEY_LOCAL_MACHINE,
        }
    }

    fn check(
        status: WIN32_ERROR,
        operation: &'static str,
        root: RegistryRoot,
        key: &str,
    ) -> RegistryResult<()> {
        if status == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(RegistryError::Os {
                operation,
                root,
                key: key.to_string(),
                code: status.0,
            })
        }
    }

    /// Open an existing key. `Ok(None)` when it does not exist.
    fn open(
        &self,
        root: RegistryRoot,
        key: &str,
        access: REG_SAM_FLAGS,
    ) -> RegistryResult<Option<OpenKey>> {
        let wide = key.to_wide();
        let mut handle = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(
                Self::hive(root),
                PCWSTR(wide.as_ptr()),
                0,
                access,
                &mut handle,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        Self::check(status, "RegOpenKeyExW", root, key)?;
        Ok(Some(OpenKey(handle)))
    }

    fn open_existing(
        &self,
        root: RegistryRoot,
        key: &str,
        access: REG_SAM_FLAGS,
    ) -> RegistryResult<OpenKey> {
        self.open(root, key, access)?
            .ok_or_else(|| RegistryError::KeyNotFound {
                root,
                key: key.to_string(),
            })
    }
}

impl RegistryOperations for WindowsRegistry {
    fn key_exists(&self, root: RegistryRoot, key: &str) -> RegistryResult<bool> {
        Ok(self.open(root, &normalize_key(key), KEY_READ)?.is_some())
    }

    fn create_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()> {
        let key = normalize_key(key);
        let wide = key.as_str().to_wide();
        let mut handle = HKEY::default();
        let status = unsafe {
            RegCreateKeyExW(
                Self::hive(root),
                PCWSTR(wide.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_WRITE,
                None,
                &mut handle,
                None,
            )
        };
        Self::check(status, "RegCreateKeyExW", root, &key)?;
        drop(OpenKey(handle));
        Ok(())
    }

    fn delete_key(&self, root: RegistryRoot, key: &str) -> RegistryResult<()> {
        let key = normalize_key(key);
        if !self.subkeys(root, &key)?.is_empty() {
            return Err(RegistryError::HasSubkeys { root, key });
        }
        let wide = key.as_str().to_wide();
        let status = unsafe { RegDeleteKeyW(Self::hive(root), PCWSTR(wide.as_ptr())) };
        if status == ERROR_FILE_NOT_FOUND {
            return Err(RegistryError::KeyNotFound { root, key });
        }
        Self::check(status, "RegDeleteKeyW", root, &key)
    }

    fn get_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
    ) -> RegistryResult<Option<RegistryValue>> {
        let key = normalize_key(key);
        let handle = match self.open(root, &key, KEY_READ)? {
            Some(handle) => handle,
            None => return Ok(None),
        };
        let wide_name = name.to_wide();
        let mut kind = REG_VALUE_TYPE::default();
        let mut size = 0u32;

        let status = unsafe {
            RegQueryValueExW(
                handle.0,
                PCWSTR(wide_name.as_ptr()),
                None,
                Some(&mut kind),
                None,
                Some(&mut size),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        Self::check(status, "RegQueryValueExW", root, &key)?;

        let mut data = vec![0u8; size as usize];
        let status = unsafe {
            RegQueryValueExW(
                handle.0,
                PCWSTR(wide_name.as_ptr()),
                None,
                Some(&mut kind),
                Some(data.as_mut_ptr()),
                Some(&mut size),
            )
        };
        Self::check(status, "RegQueryValueExW", root, &key)?;
        data.truncate(size as usize);

        Ok(Some(decode(kind, &data)))
    }

    fn set_value(
        &self,
        root: RegistryRoot,
        key: &str,
        name: &str,
        value: &RegistryValue,
    ) -> RegistryResult<()> {
        let key = normalize_key(key);
        let handle = self.open_existing(root, &key, KEY_WRITE)?;
        let wide_name = name.to_wide();
        let (kind, bytes) = encode(value);
        let status = unsafe {
            RegSetValueExW(handle.0, PCWSTR(wide_name.as_ptr()), 0, kind, Some(&bytes))
        };
        Self::check(status, "RegSetValueExW", root, &key)
    }

    fn delete_value(&self, root: RegistryRoot, key: &str, name: &str) -> RegistryResult<()> {
        let key = normalize_key(key);
        let handle = self.open_existing(root, &key, KEY_WRITE)?;
        let wide_name = name.to_wide();
        let status = unsafe { RegDeleteValueW(handle.0, PCWSTR(wide_name.as_ptr())) };
        if status == ERROR_FILE_NOT_FOUND {
            return Err(RegistryError::ValueNotFound {
                root,
                key,
                name: name.to_string(),
            });
        }
        Self::check(status, "RegDeleteValueW", root, &key)
    }

    fn subkeys(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>> {
        let key = normalize_key(key);
        let handle = self.open_existing(root, &key, KEY_READ)?;
        let mut names = Vec::new();
        let mut buffer = vec![0u16; MAX_KEY_NAME];
        for index in 0.. {
            let mut len = buffer.len() as u32;
            let status = unsafe {
                RegEnumKeyExW(
                    handle.0,
                    index,
                    PWSTR(buffer.as_mut_ptr()),
                    &mut len,
                    None,
                    PWSTR::null(),
                    None,
                    None,
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            Self::check(status, "RegEnumKeyExW", root, &key)?;
            names.push(String::from_utf16_lossy(&buffer[..len as usize]));
        }
        Ok(names)
    }

    fn value_names(&self, root: RegistryRoot, key: &str) -> RegistryResult<Vec<String>> {
        let key = normalize_key(key);
        let handle = self.open_existing(root, &key, KEY_READ)?;
        let mut names = Vec::new();
        let mut buffer = vec![0u16; MAX_VALUE_NAME];
        for index in 0.. {
            let mut len = buffer.len() as u32;
            let status = unsafe {
                RegEnumValueW(
                    handle.0,
                    index,
                    PWSTR(buffer.as_mut_ptr()),
                    &mut len,
                    None,
                    None,
                    None,
                    None,
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            Self::check(status, "RegEnumValueW", root, &key)?;
            names.push(String::from_utf16_lossy(&buffer[..len as usize]));
        }
        Ok(names)
    }
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

fn decode(kind: REG_VALUE_TYPE, data: &[u8]) -> RegistryValue {
    let text = || {
        let units = utf16_units(data);
        let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
        String::from_utf16_lossy(&units[..end])
    };
    match kind {
        REG_SZ => RegistryValue::String(text()),
        REG_EXPAND_SZ => RegistryValue::ExpandString(text()),
        REG_DWORD if data.len() >= 4 => {
            RegistryValue::Dword(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
        }
        REG_QWORD if data.len() >= 8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[..8]);
            RegistryValue::Qword(u64::from_le_bytes(bytes))
        }
        REG_MULTI_SZ => RegistryValue::MultiString(
            utf16_units(data)
                .split(|&u| u == 0)
                .filter(|s| !s.is_empty())
                .map(String::from_utf16_lossy)
                .collect(),
        ),
        _ => RegistryValue::Binary(data.to_vec()),
    }
}

fn encode(value: &RegistryValue) -> (REG_VALUE_TYPE, Vec<u8>) {
    fn wide_bytes(units: impl Iterator<Item = u16>) -> Vec<u8> {
        units.flat_map(|u| u.to_le_bytes()).collect()
    }

    match value {
        RegistryValue::String(s) => (REG_SZ, wide_bytes(s.encode_utf16().chain(once(0)))),
        RegistryValue::ExpandString(s) => {
            (REG_EXPAND_SZ, wide_bytes(s.encode_utf16().chain(once(0))))
        }
        RegistryValue::Dword(n) => (REG_DWORD, n.to_le_bytes().to_vec()),
        RegistryValue::Qword(n) => (REG_QWORD, n.to_le_bytes().to_vec()),
        RegistryValue::Binary(bytes) => (REG_BINARY, bytes.clone()),
        RegistryValue::MultiString(items) => {
            let units = items
                .iter()
                .flat_map(|s| s.encode_utf16().chain(once(0)))
                .chain(once(0));
            (REG_MULTI_SZ, wide_bytes(units))
        }
    }
}
