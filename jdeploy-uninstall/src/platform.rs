//! Host operating system and architecture identification.

use std::fmt;

/// Operating system family of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl OsFamily {
    /// Family of the operating system this binary was compiled for.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a family.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            "linux" => OsFamily::Linux,
            _ => OsFamily::Other,
        }
    }

    /// Whether registry and Windows PATH phases apply on this family.
    pub fn has_registry(&self) -> bool {
        matches!(self, OsFamily::Windows)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOs => "macos",
            OsFamily::Linux => "linux",
            OsFamily::Other => "other",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Architecture identifier used in manifest and package paths.
///
/// `x64`, `arm64` and `x86` for the common targets, otherwise the raw
/// `std::env::consts::ARCH` value.
pub fn current_architecture() -> String {
    normalize_architecture(std::env::consts::ARCH)
}

/// Map a Rust target architecture name to the installer's naming.
pub fn normalize_architecture(arch: &str) -> String {
    match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" | "i386" | "i686" => "x86",
        other => other,
    }
    .to_string()
}
