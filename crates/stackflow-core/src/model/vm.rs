//! VM instance and floating IP descriptors

use super::{Descriptor, PortConfig, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VM_BOOT_TIMEOUT: u64 = 900;
pub const DEFAULT_VM_DELETE_TIMEOUT: u64 = 300;

/// Floating IP bound to one of an instance's ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIpConfig {
    pub name: String,
    #[serde(default)]
    pub port_name: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
    /// Router whose gateway provides the address; `None` when adopted and
    /// the router could not be resolved
    #[serde(default)]
    pub router_name: Option<String>,
    /// Subnet holding the fixed IP the floating IP maps to
    #[serde(default)]
    pub subnet_name: Option<String>,
    #[serde(default = "super::default_true")]
    pub provisioning: bool,
}

impl Descriptor for FloatingIpConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::FloatingIp)?;
        if let Some(router_name) = &self.router_name {
            require(router_name, "router_name", ConfigError::FloatingIp)?;
        }
        if self.port_name.is_none() && self.port_id.is_none() {
            return Err(ConfigError::FloatingIp(
                "port_name or port_id is required".to_string(),
            ));
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::FloatingIp(message.into())
    }
}

/// Nova server descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmInstanceConfig {
    pub name: String,
    pub flavor: String,
    pub port_settings: Vec<PortConfig>,
    pub security_group_names: Vec<String>,
    pub floating_ip_settings: Vec<FloatingIpConfig>,
    /// Seconds to wait for ACTIVE
    pub vm_boot_timeout: u64,
    /// Seconds to wait for the server to disappear after delete
    pub vm_delete_timeout: u64,
    pub availability_zone: Option<String>,
    pub userdata: Option<String>,
}

impl Default for VmInstanceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            flavor: String::new(),
            port_settings: Vec::new(),
            security_group_names: Vec::new(),
            floating_ip_settings: Vec::new(),
            vm_boot_timeout: DEFAULT_VM_BOOT_TIMEOUT,
            vm_delete_timeout: DEFAULT_VM_DELETE_TIMEOUT,
            availability_zone: None,
            userdata: None,
        }
    }
}

impl VmInstanceConfig {
    pub fn new(name: impl Into<String>, flavor: impl Into<String>, port: PortConfig) -> Self {
        Self {
            name: name.into(),
            flavor: flavor.into(),
            port_settings: vec![port],
            ..Default::default()
        }
    }
}

impl Descriptor for VmInstanceConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::VmInstance)?;
        require(&self.flavor, "flavor", ConfigError::VmInstance)?;
        if self.port_settings.is_empty() {
            return Err(ConfigError::VmInstance(
                "at least one port is required".to_string(),
            ));
        }
        for port in &self.port_settings {
            port.validate()?;
        }
        for fip in &self.floating_ip_settings {
            fip.validate()?;
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::VmInstance(message.into())
    }
}
