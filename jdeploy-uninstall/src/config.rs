//! Configuration for the uninstall subsystem.
//!
//! Values resolve in this order, later sources winning:
//!
//! 1. defaults derived from the user's home directory
//! 2. the `JDEPLOY_HOME` environment variable
//! 3. `<jdeploy_home>/uninstall.ini`
//!
//! ```ini
//! [manifest]
//! validation = strict
//!
//! [system]
//! architecture = x64
//!
//! [logging]
//! level = info
//! file = true
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::layout::{Layout, JDEPLOY_DIR_NAME};
use crate::platform;
use crate::xml::ValidationMode;

/// Name of the optional configuration file inside the jDeploy home.
pub const CONFIG_FILE_NAME: &str = "uninstall.ini";

/// Environment variable overriding the jDeploy home directory.
pub const JDEPLOY_HOME_ENV: &str = "JDEPLOY_HOME";

/// Name of the log file inside `<jdeploy_home>/logs`.
pub const LOG_FILE_NAME: &str = "uninstall.log";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user's home directory")]
    NoHomeDirectory,

    #[error("failed to read config file {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: ini::Error },

    #[error("invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct UninstallConfig {
    /// The user's home directory; `${USER_HOME}` in manifests.
    pub home_dir: PathBuf,

    /// Per-user jDeploy data directory; `${JDEPLOY_HOME}` in manifests.
    pub jdeploy_home: PathBuf,

    /// Architecture segment of manifest and package paths.
    pub architecture: String,

    /// Validation tier applied when reading and writing manifests.
    pub validation: ValidationMode,

    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,

    /// Whether to also log to `<jdeploy_home>/logs/uninstall.log`.
    pub log_to_file: bool,
}

impl UninstallConfig {
    /// Defaults for a home directory.
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        let home_dir = home_dir.into();
        Self {
            jdeploy_home: home_dir.join(JDEPLOY_DIR_NAME),
            home_dir,
            architecture: platform::current_architecture(),
            validation: ValidationMode::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_to_file: true,
        }
    }

    /// Resolve from the environment and the optional config file.
    pub fn load() -> Result<Self, ConfigError> {
        let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        let jdeploy_home = std::env::var_os(JDEPLOY_HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::load_from(home_dir, jdeploy_home)
    }

    /// Resolve with an explicit home and optional jDeploy home override.
    pub fn load_from(
        home_dir: impl Into<PathBuf>,
        jdeploy_home: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::new(home_dir);
        if let Some(jdeploy_home) = jdeploy_home {
            config.jdeploy_home = jdeploy_home;
        }

        let path = config.config_file_path();
        if path.is_file() {
            let ini = Ini::load_from_file(&path).map_err(|e| ConfigError::ReadFailed {
                path: path.clone(),
                source: e,
            })?;
            config.apply_ini(&ini)?;
        }
        Ok(config)
    }

    /// Overlay settings from a parsed INI document.
    pub fn apply_ini(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        if let Some(value) = get(ini, "manifest", "validation") {
            self.validation = value.parse().map_err(|reason: String| ConfigError::InvalidValue {
                section: "manifest",
                key: "validation",
                value: value.to_string(),
                reason,
            })?;
        }

        if let Some(value) = get(ini, "system", "architecture") {
            self.architecture = value.to_string();
        }

        if let Some(value) = get(ini, "logging", "level") {
            self.log_level = value.to_string();
        }

        if let Some(value) = get(ini, "logging", "file") {
            self.log_to_file = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                section: "logging",
                key: "file",
                value: value.to_string(),
                reason: "expected true or false".to_string(),
            })?;
        }

        Ok(())
    }

    pub fn with_jdeploy_home(mut self, path: impl Into<PathBuf>) -> Self {
        self.jdeploy_home = path.into();
        self
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = architecture.into();
        self
    }

    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = enabled;
        self
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.home_dir, &self.jdeploy_home, &self.architecture)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.jdeploy_home.join(CONFIG_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.jdeploy_home.join("logs")
    }

    /// Log file path when file logging is enabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_to_file
            .then(|| self.log_dir().join(LOG_FILE_NAME))
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }
}

fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
