//! Router descriptor

use super::{Descriptor, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub name: String,
    pub project_name: Option<String>,
    /// Name of the external network used as gateway
    pub external_gateway: Option<String>,
    pub admin_state_up: bool,
    pub enable_snat: Option<bool>,
    /// Subnet names attached as router interfaces
    pub internal_subnets: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            project_name: None,
            external_gateway: None,
            admin_state_up: true,
            enable_snat: None,
            internal_subnets: Vec::new(),
        }
    }
}

impl RouterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Descriptor for RouterConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Router)?;
        if self.internal_subnets.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Router(
                "internal subnet names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Router(message.into())
    }
}
