//! Flavor descriptor

use super::{Descriptor, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nova flavor descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorConfig {
    pub name: String,

    /// Requested flavor ID; "auto" lets the platform assign one
    pub flavor_id: String,

    /// Memory in MB
    pub ram: u64,

    /// Root disk in GB
    pub disk: u64,

    pub vcpus: u32,

    pub ephemeral: u64,

    /// Swap in MB
    pub swap: u64,

    pub rxtx_factor: f64,

    pub is_public: bool,

    pub metadata: HashMap<String, String>,
}

impl Default for FlavorConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            flavor_id: "auto".to_string(),
            ram: 0,
            disk: 0,
            vcpus: 0,
            ephemeral: 0,
            swap: 0,
            rxtx_factor: 1.0,
            is_public: true,
            metadata: HashMap::new(),
        }
    }
}

impl FlavorConfig {
    pub fn new(name: impl Into<String>, ram: u64, disk: u64, vcpus: u32) -> Self {
        Self {
            name: name.into(),
            ram,
            disk,
            vcpus,
            ..Default::default()
        }
    }
}

impl Descriptor for FlavorConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Flavor)?;
        require(&self.flavor_id, "flavor_id", ConfigError::Flavor)?;
        if self.ram == 0 {
            return Err(ConfigError::Flavor("ram must be greater than 0".to_string()));
        }
        if self.vcpus == 0 {
            return Err(ConfigError::Flavor(
                "vcpus must be greater than 0".to_string(),
            ));
        }
        if self.rxtx_factor <= 0.0 {
            return Err(ConfigError::Flavor(
                "rxtx_factor must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Flavor(message.into())
    }
}
