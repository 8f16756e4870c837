//! Outcome of a multi-resource teardown

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// Result of cleaning a set of resources
///
/// Teardown keeps going after individual failures; the report collects
/// what was removed and what was left behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Labels of resources cleaned successfully
    pub cleaned: Vec<String>,

    /// Resources whose clean failed
    pub failed: Vec<CleanupFailure>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

/// One failed clean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupFailure {
    pub resource: String,
    pub error: String,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, resource: impl Into<String>) {
        self.cleaned.push(resource.into());
    }

    pub fn add_failure(&mut self, resource: impl Into<String>, error: impl ToString) {
        self.failed.push(CleanupFailure {
            resource: resource.into(),
            error: error.to_string(),
        });
    }

    /// Collapses the report into a single [`CloudError::Cleanup`] when
    /// anything failed.
    pub fn into_result(self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        let detail = self
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.resource, f.error))
            .collect::<Vec<_>>()
            .join("; ");
        Err(CloudError::Cleanup(detail))
    }
}

impl std::fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cleaned, {} failed",
            self.cleaned.len(),
            self.failed.len()
        )
    }
}
