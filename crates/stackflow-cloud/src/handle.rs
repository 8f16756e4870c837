//! Remote resource handles
//!
//! A handle is a snapshot of what the platform reported at query time. It is
//! never updated in place: observing a status transition means querying
//! again and replacing the handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackflow_core::{AddressPair, ControlLocation, HostRoute};
use std::collections::HashMap;

/// Common accessors shared by every handle type
pub trait RemoteResource: Clone + std::fmt::Debug + Send + Sync {
    /// Kind label used in logs and errors
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn name(&self) -> &str;
}

macro_rules! remote_resource {
    ($($ty:ident => $kind:literal),* $(,)?) => {
        $(
            impl RemoteResource for $ty {
                const KIND: &'static str = $kind;

                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

remote_resource! {
    Image => "image",
    Flavor => "flavor",
    Keypair => "keypair",
    Network => "network",
    Subnet => "subnet",
    Port => "port",
    Router => "router",
    Project => "project",
    User => "user",
    Volume => "volume",
    VolumeType => "volume type",
    Server => "VM instance",
    Stack => "stack",
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    pub ram: u64,
    pub disk: u64,
    pub vcpus: u32,
    #[serde(default)]
    pub ephemeral: u64,
    #[serde(default)]
    pub swap: u64,
    pub rxtx_factor: f64,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    pub id: String,
    pub name: String,
    pub public_key: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    /// Only present on the response to a create without a public key
    #[serde(default)]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub admin_state_up: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub physical_network: Option<String>,
    #[serde(default)]
    pub segmentation_id: Option<u32>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub subnet_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPool {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub cidr: String,
    pub ip_version: u8,
    #[serde(default)]
    pub gateway_ip: Option<String>,
    pub enable_dhcp: bool,
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
    #[serde(default)]
    pub host_routes: Vec<HostRoute>,
    #[serde(default)]
    pub allocation_pools: Vec<AllocationPool>,
    #[serde(default)]
    pub ipv6_ra_mode: Option<String>,
    #[serde(default)]
    pub ipv6_address_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    pub subnet_id: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub mac_address: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub device_owner: Option<String>,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    pub admin_state_up: bool,
    #[serde(default)]
    pub allowed_address_pairs: Vec<AddressPair>,
}

impl Port {
    /// DHCP agent ports are infrastructure, not user attachments.
    pub fn is_dhcp(&self) -> bool {
        self.device_owner.as_deref() == Some("network:dhcp")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    pub id: String,
    pub name: String,
    pub status: String,
    pub admin_state_up: bool,
    #[serde(default)]
    pub external_network_id: Option<String>,
    #[serde(default)]
    pub enable_snat: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    pub floating_ip_address: String,
    #[serde(default)]
    pub fixed_ip_address: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub router_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub domain_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub default_project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub status: String,
    pub size: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub multi_attach: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeTypeEncryption {
    pub provider: String,
    pub control_location: ControlLocation,
    #[serde(default)]
    pub cipher: Option<String>,
    #[serde(default)]
    pub key_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosSpec {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub public: bool,
    #[serde(default)]
    pub encryption: Option<VolumeTypeEncryption>,
    #[serde(default)]
    pub qos_spec: Option<QosSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Flavor name
    pub flavor: String,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub keypair_name: Option<String>,
    #[serde(default)]
    pub security_group_names: Vec<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Declared template output of a deployed stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOutput {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
}

impl StackOutput {
    /// The value as text; non-string values are rendered as JSON.
    pub fn value_string(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// One node of a deployed stack's resource tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Logical name from the template
    pub name: String,
    /// Template type tag, e.g. `OS::Nova::Server`
    pub resource_type: String,
    /// Physical ID of the platform resource (a nested stack ID for groups)
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub status_reason: Option<String>,
}

impl std::fmt::Display for ResourceNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.resource_type, self.status)?;
        if let Some(reason) = &self.status_reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}
