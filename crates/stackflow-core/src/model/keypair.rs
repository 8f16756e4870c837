//! Keypair descriptor

use super::{Descriptor, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_KEY_SIZE: u32 = 2048;
const MIN_KEY_SIZE: u32 = 512;

/// Nova keypair descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypairConfig {
    pub name: String,

    /// Public key to register; generated by the platform when absent
    pub public_filepath: Option<PathBuf>,

    /// Where the private key is (or will be) stored locally
    pub private_filepath: Option<PathBuf>,

    /// Remove the local key files when the keypair is cleaned
    pub delete_on_clean: bool,

    pub key_size: u32,
}

impl Default for KeypairConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            public_filepath: None,
            private_filepath: None,
            delete_on_clean: false,
            key_size: DEFAULT_KEY_SIZE,
        }
    }
}

impl KeypairConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_private_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_filepath = Some(path.into());
        self
    }

    pub fn with_public_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_filepath = Some(path.into());
        self
    }
}

impl Descriptor for KeypairConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Keypair)?;
        if self.key_size < MIN_KEY_SIZE {
            return Err(ConfigError::Keypair(format!(
                "key_size must be at least {}",
                MIN_KEY_SIZE
            )));
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Keypair(message.into())
    }
}
