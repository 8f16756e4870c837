//! Cloud operation error types

use crate::handle::ResourceNode;
use stackflow_core::ConfigError;
use thiserror::Error;

/// Cloud operation errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// Lookup or delete target does not exist. Never fatal for `clean()`.
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terminal failure status reached while waiting for creation
    #[error("{kind} {name} creation failed with status {status}")]
    CreationFailed {
        kind: &'static str,
        name: String,
        status: String,
        /// Child resources that did not reach their expected state
        children: Vec<ResourceNode>,
    },

    #[error("{kind} {name} was not ready within the timeout (last status {status})")]
    CreationTimeout {
        kind: &'static str,
        name: String,
        status: String,
    },

    /// Delete retries were exhausted without reaching the deleted state
    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CloudError::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Maps a not-found response to `None`, keeping every other error.
pub fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Treats a not-found response from a delete call as success.
pub fn ignore_not_found(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => {
            tracing::debug!("Delete target already gone: {}", e);
            Ok(())
        }
        other => other,
    }
}
