//! Outcome of one uninstall run.

use std::fmt;

use serde::Serialize;

/// Tally of reversal operations.
///
/// A target that was already gone counts as a success, so repeating an
/// uninstall on a clean system is still successful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallResult {
    success_count: usize,
    failure_count: usize,
    errors: Vec<String>,
}

impl UninstallResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Count a failure and keep its message.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.failure_count += 1;
        self.errors.push(error.into());
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Failure messages in the order they occurred.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// True when no operation failed.
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }
}

impl fmt::Display for UninstallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed",
            self.success_count, self.failure_count
        )
    }
}
