//! Closed enumerations used by the manifest model.
//!
//! Every enum carries an explicit two-way token table. The tokens are the
//! exact strings written to the XML document; lookups are case-sensitive.

use std::fmt;

use serde::Serialize;

/// Kind of an installed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileType {
    /// Executable launcher or native binary.
    Binary,
    /// Shell or batch script.
    Script,
    /// Symbolic link. Removed without following it.
    Link,
    /// Configuration file.
    Config,
    /// Icon or other desktop artwork.
    Icon,
    /// Installer bookkeeping (e.g. `.desktop` files, version stamps).
    Metadata,
}

impl FileType {
    /// All tokens accepted in the `file@type` attribute.
    pub const TOKENS: &'static [&'static str] =
        &["binary", "script", "link", "config", "icon", "metadata"];

    /// Token written to the manifest.
    pub fn as_token(&self) -> &'static str {
        match self {
            FileType::Binary => "binary",
            FileType::Script => "script",
            FileType::Link => "link",
            FileType::Config => "config",
            FileType::Icon => "icon",
            FileType::Metadata => "metadata",
        }
    }

    /// Parse a manifest token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "binary" => Some(FileType::Binary),
            "script" => Some(FileType::Script),
            "link" => Some(FileType::Link),
            "config" => Some(FileType::Config),
            "icon" => Some(FileType::Icon),
            "metadata" => Some(FileType::Metadata),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Removal policy for an installed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CleanupStrategy {
    /// Remove the directory and everything under it.
    Always,
    /// Remove the directory only when nothing is left in it.
    ///
    /// Shared directories such as a common `bin` survive as long as another
    /// package still has entries there.
    IfEmpty,
    /// Remove all children but keep the directory itself.
    ContentsOnly,
}

impl CleanupStrategy {
    /// All tokens accepted in the `directory@cleanup` attribute.
    pub const TOKENS: &'static [&'static str] = &["always", "ifEmpty", "contentsOnly"];

    pub fn as_token(&self) -> &'static str {
        match self {
            CleanupStrategy::Always => "always",
            CleanupStrategy::IfEmpty => "ifEmpty",
            CleanupStrategy::ContentsOnly => "contentsOnly",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "always" => Some(CleanupStrategy::Always),
            "ifEmpty" => Some(CleanupStrategy::IfEmpty),
            "contentsOnly" => Some(CleanupStrategy::ContentsOnly),
            _ => None,
        }
    }
}

impl fmt::Display for CleanupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Registry hive a key lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegistryRoot {
    #[serde(rename = "HKEY_CURRENT_USER")]
    CurrentUser,
    #[serde(rename = "HKEY_LOCAL_MACHINE")]
    LocalMachine,
}

impl RegistryRoot {
    pub const TOKENS: &'static [&'static str] = &["HKEY_CURRENT_USER", "HKEY_LOCAL_MACHINE"];

    pub fn as_token(&self) -> &'static str {
        match self {
            RegistryRoot::CurrentUser => "HKEY_CURRENT_USER",
            RegistryRoot::LocalMachine => "HKEY_LOCAL_MACHINE",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HKEY_CURRENT_USER" => Some(RegistryRoot::CurrentUser),
            "HKEY_LOCAL_MACHINE" => Some(RegistryRoot::LocalMachine),
            _ => None,
        }
    }
}

impl fmt::Display for RegistryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Data type of a registry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegistryValueType {
    #[serde(rename = "REG_SZ")]
    String,
    #[serde(rename = "REG_EXPAND_SZ")]
    ExpandString,
    #[serde(rename = "REG_DWORD")]
    Dword,
    #[serde(rename = "REG_QWORD")]
    Qword,
    #[serde(rename = "REG_BINARY")]
    Binary,
    #[serde(rename = "REG_MULTI_SZ")]
    MultiString,
}

impl RegistryValueType {
    pub const TOKENS: &'static [&'static str] = &[
        "REG_SZ",
        "REG_EXPAND_SZ",
        "REG_DWORD",
        "REG_QWORD",
        "REG_BINARY",
        "REG_MULTI_SZ",
    ];

    pub fn as_token(&self) -> &'static str {
        match self {
            RegistryValueType::String => "REG_SZ",
            RegistryValueType::ExpandString => "REG_EXPAND_SZ",
            RegistryValueType::Dword => "REG_DWORD",
            RegistryValueType::Qword => "REG_QWORD",
            RegistryValueType::Binary => "REG_BINARY",
            RegistryValueType::MultiString => "REG_MULTI_SZ",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "REG_SZ" => Some(RegistryValueType::String),
            "REG_EXPAND_SZ" => Some(RegistryValueType::ExpandString),
            "REG_DWORD" => Some(RegistryValueType::Dword),
            "REG_QWORD" => Some(RegistryValueType::Qword),
            "REG_BINARY" => Some(RegistryValueType::Binary),
            "REG_MULTI_SZ" => Some(RegistryValueType::MultiString),
            _ => None,
        }
    }
}

impl fmt::Display for RegistryValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE_TYPES: [FileType; 6] = [
        FileType::Binary,
        FileType::Script,
        FileType::Link,
        FileType::Config,
        FileType::Icon,
        FileType::Metadata,
    ];

    #[test]
    fn test_file_type_tokens_match_table() {
        let tokens: Vec<&str> = FILE_TYPES.iter().map(|t| t.as_token()).collect();
        assert_eq!(tokens, FileType::TOKENS);
        for t in FILE_TYPES {
            assert_eq!(FileType::from_token(t.as_token()), Some(t));
        }
    }

    #[test]
    fn test_file_type_lookup_is_case_sensitive() {
        assert_eq!(FileType::from_token("BINARY"), None);
        assert_eq!(FileType::from_token("Binary"), None);
        assert_eq!(FileType::from_token(""), None);
    }

    #[test]
    fn test_cleanup_tokens_are_lower_camel() {
        assert_eq!(CleanupStrategy::IfEmpty.as_token(), "ifEmpty");
        assert_eq!(CleanupStrategy::ContentsOnly.as_token(), "contentsOnly");
        assert_eq!(
            CleanupStrategy::from_token("contentsOnly"),
            Some(CleanupStrategy::ContentsOnly)
        );
        assert_eq!(CleanupStrategy::from_token("IF_EMPTY"), None);
        assert_eq!(CleanupStrategy::from_token("if_empty"), None);
    }

    #[test]
    fn test_registry_root_is_verbatim() {
        for token in RegistryRoot::TOKENS {
            let root = RegistryRoot::from_token(token).unwrap();
            assert_eq!(root.as_token(), *token);
        }
        assert_eq!(RegistryRoot::from_token("HKCU"), None);
    }

    #[test]
    fn test_value_type_table() {
        for token in RegistryValueType::TOKENS {
            let ty = RegistryValueType::from_token(token).unwrap();
            assert_eq!(ty.to_string(), *token);
        }
        assert_eq!(RegistryValueType::from_token("reg_sz"), None);
    }

    #[test]
    fn test_serde_uses_manifest_tokens() {
        assert_eq!(
            serde_json::to_string(&CleanupStrategy::IfEmpty).unwrap(),
            "\"ifEmpty\""
        );
        assert_eq!(
            serde_json::to_string(&RegistryRoot::LocalMachine).unwrap(),
            "\"HKEY_LOCAL_MACHINE\""
        );
        assert_eq!(
            serde_json::to_string(&RegistryValueType::ExpandString).unwrap(),
            "\"REG_EXPAND_SZ\""
        );
    }
}
