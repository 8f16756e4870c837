//! Network, subnet and port descriptors

use super::{Descriptor, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Neutron network descriptor, including the subnets to create on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub admin_state_up: bool,
    pub shared: Option<bool>,
    pub project_name: Option<String>,
    pub external: bool,
    pub network_type: Option<String>,
    pub physical_network: Option<String>,
    pub segmentation_id: Option<u32>,
    pub mtu: Option<u32>,
    pub subnets: Vec<SubnetConfig>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            admin_state_up: true,
            shared: None,
            project_name: None,
            external: false,
            network_type: None,
            physical_network: None,
            segmentation_id: None,
            mtu: None,
            subnets: Vec::new(),
        }
    }
}

impl NetworkConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_subnet(mut self, subnet: SubnetConfig) -> Self {
        self.subnets.push(subnet);
        self
    }
}

impl Descriptor for NetworkConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Network)?;
        for subnet in &self.subnets {
            subnet.validate()?;
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Network(message.into())
    }
}

/// Static route pushed to DHCP clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRoute {
    pub destination: String,
    pub nexthop: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetConfig {
    pub name: String,
    pub cidr: String,
    pub ip_version: u8,
    pub project_name: Option<String>,
    /// First address of the allocation pool
    pub start: Option<String>,
    /// Last address of the allocation pool
    pub end: Option<String>,
    pub gateway_ip: Option<String>,
    pub enable_dhcp: Option<bool>,
    pub dns_nameservers: Vec<String>,
    pub host_routes: Vec<HostRoute>,
    pub ipv6_ra_mode: Option<String>,
    pub ipv6_address_mode: Option<String>,
}

impl Default for SubnetConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            cidr: String::new(),
            ip_version: 4,
            project_name: None,
            start: None,
            end: None,
            gateway_ip: None,
            enable_dhcp: None,
            dns_nameservers: Vec::new(),
            host_routes: Vec::new(),
            ipv6_ra_mode: None,
            ipv6_address_mode: None,
        }
    }
}

impl SubnetConfig {
    pub fn new(name: impl Into<String>, cidr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cidr: cidr.into(),
            ..Default::default()
        }
    }
}

impl Descriptor for SubnetConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Subnet)?;
        require(&self.cidr, "cidr", ConfigError::Subnet)?;
        match self.ip_version {
            4 => {
                if self.ipv6_ra_mode.is_some() || self.ipv6_address_mode.is_some() {
                    return Err(ConfigError::Subnet(format!(
                        "subnet {} sets IPv6 modes on an IPv4 subnet",
                        self.name
                    )));
                }
            }
            6 => {}
            other => {
                return Err(ConfigError::Subnet(format!(
                    "ip_version must be 4 or 6, got {}",
                    other
                )));
            }
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Subnet(message.into())
    }
}

/// Fixed IP request on a port, addressed by subnet name
///
/// `subnet_name` is `None` for an adopted address whose subnet could not be
/// resolved. Such an entry cannot be used to create a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIpConfig {
    #[serde(default)]
    pub subnet_name: Option<String>,
    pub ip: String,
}

impl FixedIpConfig {
    pub fn new(subnet_name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            subnet_name: Some(subnet_name.into()),
            ip: ip.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPair {
    pub ip_address: String,
    pub mac_address: Option<String>,
}

/// Neutron port descriptor
///
/// `network_name` is `None` only for adopted ports whose network is gone;
/// [`PortConfig::creatable`] rejects those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub name: String,
    pub network_name: Option<String>,
    pub project_name: Option<String>,
    pub mac_address: Option<String>,
    pub ip_addrs: Vec<FixedIpConfig>,
    pub security_groups: Vec<String>,
    pub allowed_address_pairs: Vec<AddressPair>,
    pub admin_state: bool,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            network_name: None,
            project_name: None,
            mac_address: None,
            ip_addrs: Vec::new(),
            security_groups: Vec::new(),
            allowed_address_pairs: Vec::new(),
            admin_state: true,
        }
    }
}

impl PortConfig {
    pub fn new(name: impl Into<String>, network_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            network_name: Some(network_name.into()),
            ..Default::default()
        }
    }

    /// Checks that every reference needed to create the port is resolved.
    pub fn creatable(&self) -> Result<()> {
        self.validate()?;
        if self.network_name.is_none() {
            return Err(ConfigError::Port(format!(
                "the attribute network_name is required to create port {}",
                self.name
            )));
        }
        if let Some(ip) = self.ip_addrs.iter().find(|ip| ip.subnet_name.is_none()) {
            return Err(ConfigError::Port(format!(
                "fixed IP {} of port {} has no subnet",
                ip.ip, self.name
            )));
        }
        Ok(())
    }
}

impl Descriptor for PortConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Port)?;
        if let Some(network_name) = &self.network_name {
            require(network_name, "network_name", ConfigError::Port)?;
        }
        for ip in &self.ip_addrs {
            if let Some(subnet_name) = &ip.subnet_name {
                require(subnet_name, "subnet_name", ConfigError::Port)?;
            }
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Port(message.into())
    }
}
