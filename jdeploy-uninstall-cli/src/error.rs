//! CLI error type and exit codes.

use std::fmt;

use jdeploy_uninstall::logging::LoggingError;
use jdeploy_uninstall::store::StoreError;
use jdeploy_uninstall::ConfigError;

/// Exit code for a run where every operation succeeded.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when any operation failed.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for usage and configuration errors.
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be resolved.
    Config(String),
    /// Reading or writing a manifest failed.
    Store(StoreError),
    /// No manifest is recorded for the package.
    NotFound(String),
    /// The interactive prompt failed.
    Prompt(String),
    /// Output serialization failed.
    Json(serde_json::Error),
    /// The uninstall ran but some operations failed.
    Incomplete { failures: usize },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Store(e) => write!(f, "{}", e),
            CliError::NotFound(msg) => write!(f, "{}", msg),
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
            CliError::Json(e) => write!(f, "Failed to serialize output: {}", e),
            CliError::Incomplete { failures } => {
                write!(f, "Uninstall finished with {} failed operation(s)", failures)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Store(e) => Some(e),
            CliError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("x".into()).exit_code(), EXIT_USAGE);
        assert_eq!(CliError::Incomplete { failures: 2 }.exit_code(), EXIT_FAILURE);
        assert_eq!(CliError::NotFound("x".into()).exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CliError::Incomplete { failures: 3 }.to_string(),
            "Uninstall finished with 3 failed operation(s)"
        );
    }
}
