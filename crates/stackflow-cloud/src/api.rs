//! Platform binding traits
//!
//! Each service of the platform is reached through a narrow
//! request/response trait. Implementations own transport, authentication and
//! their own request timeouts; the orchestration layer only depends on the
//! shapes below. Lookups by name return `Ok(None)` when nothing matches, and
//! lookups by ID or deletes of a missing target return
//! [`CloudError::NotFound`](crate::CloudError::NotFound).

use crate::error::Result;
use crate::handle::*;
use async_trait::async_trait;
use stackflow_core::{
    FlavorConfig, ImageConfig, NetworkConfig, OsCreds, PortConfig, ProjectConfig, RouterConfig,
    StackRequest, SubnetConfig, UserConfig, VolumeConfig, VolumeTypeConfig,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Image service
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn find_image(&self, name: &str) -> Result<Option<Image>>;

    async fn get_image(&self, id: &str) -> Result<Image>;

    /// Registers the image and starts the upload from the URL or file.
    async fn create_image(&self, config: &ImageConfig) -> Result<Image>;

    async fn delete_image(&self, image: &Image) -> Result<()>;
}

/// Request to boot a server from resolved platform IDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRequest {
    pub name: String,
    pub flavor_id: String,
    pub image_id: String,
    pub keypair_name: Option<String>,
    pub port_ids: Vec<String>,
    pub security_group_names: Vec<String>,
    pub availability_zone: Option<String>,
    pub userdata: Option<String>,
}

/// Compute service: flavors, keypairs and servers
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn find_flavor(&self, name: &str) -> Result<Option<Flavor>>;

    async fn get_flavor(&self, id: &str) -> Result<Flavor>;

    async fn create_flavor(&self, config: &FlavorConfig) -> Result<Flavor>;

    async fn delete_flavor(&self, flavor: &Flavor) -> Result<()>;

    async fn find_keypair(&self, name: &str) -> Result<Option<Keypair>>;

    /// Registers `public_key`, or lets the platform generate a pair when it
    /// is `None` (the private half is returned once, on this response).
    async fn create_keypair(&self, name: &str, public_key: Option<&str>) -> Result<Keypair>;

    async fn delete_keypair(&self, keypair: &Keypair) -> Result<()>;

    async fn find_server(&self, name: &str) -> Result<Option<Server>>;

    async fn get_server(&self, id: &str) -> Result<Server>;

    async fn create_server(&self, request: &ServerRequest) -> Result<Server>;

    async fn delete_server(&self, server: &Server) -> Result<()>;
}

/// Port query filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortFilter {
    pub network_id: Option<String>,
    pub device_id: Option<String>,
}

impl PortFilter {
    pub fn network(id: impl Into<String>) -> Self {
        Self {
            network_id: Some(id.into()),
            device_id: None,
        }
    }

    pub fn device(id: impl Into<String>) -> Self {
        Self {
            network_id: None,
            device_id: Some(id.into()),
        }
    }
}

/// Network service
#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn find_network(&self, name: &str, project_id: Option<&str>) -> Result<Option<Network>>;

    async fn get_network(&self, id: &str) -> Result<Network>;

    async fn create_network(&self, config: &NetworkConfig) -> Result<Network>;

    async fn delete_network(&self, network: &Network) -> Result<()>;

    async fn find_subnet(&self, name: &str) -> Result<Option<Subnet>>;

    async fn get_subnet(&self, id: &str) -> Result<Subnet>;

    async fn list_subnets(&self, network_id: &str) -> Result<Vec<Subnet>>;

    async fn create_subnet(&self, network: &Network, config: &SubnetConfig) -> Result<Subnet>;

    async fn delete_subnet(&self, subnet: &Subnet) -> Result<()>;

    async fn find_port(&self, name: &str) -> Result<Option<Port>>;

    async fn get_port(&self, id: &str) -> Result<Port>;

    async fn list_ports(&self, filter: &PortFilter) -> Result<Vec<Port>>;

    /// Creates a port with fixed IPs already resolved to subnet IDs.
    async fn create_port(
        &self,
        network: &Network,
        config: &PortConfig,
        fixed_ips: &[FixedIp],
    ) -> Result<Port>;

    async fn delete_port(&self, port: &Port) -> Result<()>;

    async fn find_router(&self, name: &str) -> Result<Option<Router>>;

    async fn get_router(&self, id: &str) -> Result<Router>;

    async fn create_router(
        &self,
        config: &RouterConfig,
        external_network_id: Option<&str>,
    ) -> Result<Router>;

    async fn delete_router(&self, router: &Router) -> Result<()>;

    async fn add_router_interface(&self, router: &Router, subnet: &Subnet) -> Result<Port>;

    async fn remove_router_interface(&self, router: &Router, subnet: &Subnet) -> Result<()>;

    /// Floating IPs associated with any of the given ports
    async fn list_floating_ips(&self, port_ids: &[String]) -> Result<Vec<FloatingIp>>;

    async fn create_floating_ip(
        &self,
        external_network_id: &str,
        port: &Port,
        fixed_ip_address: Option<&str>,
    ) -> Result<FloatingIp>;

    async fn delete_floating_ip(&self, floating_ip: &FloatingIp) -> Result<()>;
}

/// Identity service
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn find_project(&self, name: &str, domain: &str) -> Result<Option<Project>>;

    async fn create_project(&self, config: &ProjectConfig) -> Result<Project>;

    async fn delete_project(&self, project: &Project) -> Result<()>;

    async fn update_quotas(&self, project: &Project, quotas: &HashMap<String, i64>) -> Result<()>;

    async fn find_user(&self, name: &str, domain: &str) -> Result<Option<User>>;

    async fn create_user(&self, config: &UserConfig, project: Option<&Project>) -> Result<User>;

    async fn delete_user(&self, user: &User) -> Result<()>;

    async fn grant_role(&self, user: &User, role_name: &str, project: &Project) -> Result<()>;
}

/// Block storage service
#[async_trait]
pub trait VolumeApi: Send + Sync {
    async fn find_volume(&self, name: &str) -> Result<Option<Volume>>;

    async fn get_volume(&self, id: &str) -> Result<Volume>;

    async fn create_volume(&self, config: &VolumeConfig, image_id: Option<&str>) -> Result<Volume>;

    async fn delete_volume(&self, volume: &Volume) -> Result<()>;

    async fn find_volume_type(&self, name: &str) -> Result<Option<VolumeType>>;

    async fn get_volume_type(&self, id: &str) -> Result<VolumeType>;

    async fn create_volume_type(&self, config: &VolumeTypeConfig) -> Result<VolumeType>;

    async fn delete_volume_type(&self, volume_type: &VolumeType) -> Result<()>;
}

/// Orchestration (template deployment) service
#[async_trait]
pub trait OrchestrationApi: Send + Sync {
    async fn find_stack(&self, name: &str) -> Result<Option<Stack>>;

    async fn get_stack(&self, id: &str) -> Result<Stack>;

    async fn create_stack(&self, request: &StackRequest) -> Result<Stack>;

    async fn delete_stack(&self, stack: &Stack) -> Result<()>;

    /// Direct children of a stack (nested groups are not expanded)
    async fn list_resources(&self, stack_id: &str) -> Result<Vec<ResourceNode>>;

    async fn list_outputs(&self, stack_id: &str) -> Result<Vec<StackOutput>>;
}

/// Credentials plus one binding per service.
///
/// Cloning is cheap; every creator holds its own copy.
#[derive(Clone)]
pub struct Cloud {
    pub creds: Arc<OsCreds>,
    pub compute: Arc<dyn ComputeApi>,
    pub network: Arc<dyn NetworkApi>,
    pub image: Arc<dyn ImageApi>,
    pub identity: Arc<dyn IdentityApi>,
    pub volume: Arc<dyn VolumeApi>,
    pub orchestration: Arc<dyn OrchestrationApi>,
}

impl Cloud {
    /// Uses a single backend that implements every service.
    pub fn from_backend<B>(creds: OsCreds, backend: Arc<B>) -> Self
    where
        B: ComputeApi + NetworkApi + ImageApi + IdentityApi + VolumeApi + OrchestrationApi + 'static,
    {
        Self {
            creds: Arc::new(creds),
            compute: backend.clone(),
            network: backend.clone(),
            image: backend.clone(),
            identity: backend.clone(),
            volume: backend.clone(),
            orchestration: backend,
        }
    }

    pub fn creds(&self) -> &OsCreds {
        &self.creds
    }
}

impl std::fmt::Debug for Cloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cloud").field("creds", &self.creds).finish()
    }
}
