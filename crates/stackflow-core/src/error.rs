//! Descriptor and template error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building descriptors or loading templates.
///
/// Every variant is produced before any remote call is attempted.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid image config: {0}")]
    Image(String),

    #[error("Invalid flavor config: {0}")]
    Flavor(String),

    #[error("Invalid keypair config: {0}")]
    Keypair(String),

    #[error("Invalid network config: {0}")]
    Network(String),

    #[error("Invalid subnet config: {0}")]
    Subnet(String),

    #[error("Invalid port config: {0}")]
    Port(String),

    #[error("Invalid router config: {0}")]
    Router(String),

    #[error("Invalid project config: {0}")]
    Project(String),

    #[error("Invalid user config: {0}")]
    User(String),

    #[error("Invalid volume config: {0}")]
    Volume(String),

    #[error("Invalid volume type config: {0}")]
    VolumeType(String),

    #[error("Invalid VM instance config: {0}")]
    VmInstance(String),

    #[error("Invalid floating IP config: {0}")]
    FloatingIp(String),

    #[error("Invalid stack config: {0}")]
    Stack(String),

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Template format invalid: {0}")]
    Template(String),

    #[error("IO error: {path}\nreason: {message}")]
    Io { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
