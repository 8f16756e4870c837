//! VM instance creator
//!
//! Ports are created first, then the server is booted on them. Floating IPs
//! are associated only once the server is ACTIVE since the platform refuses
//! to bind them to ports of a server still building.

use crate::status::{
    VM_ACTIVE, VM_DELETED, VM_ERROR, creation_failed, creation_timeout, delete_failed,
};
use async_trait::async_trait;
use stackflow_cloud::{
    Cloud, CloudError, FixedIp, FloatingIp, Port, PortFilter, RemoteResource, ResourceCreator,
    Result, Server, ServerRequest, StatusPoller, ignore_not_found, optional,
};
use stackflow_core::{
    ConfigError, Descriptor, FloatingIpConfig, ImageConfig, KeypairConfig, PortConfig, VmInstanceConfig,
};
use tracing::{debug, info, warn};

pub struct VmInstanceCreator {
    cloud: Cloud,
    config: VmInstanceConfig,
    /// Unknown for adopted servers whose image is gone
    image_config: Option<ImageConfig>,
    keypair_config: Option<KeypairConfig>,
    server: Option<Server>,
    ports: Vec<Port>,
    floating_ips: Vec<FloatingIp>,
}

impl VmInstanceCreator {
    pub fn new(
        cloud: Cloud,
        config: VmInstanceConfig,
        image_config: ImageConfig,
        keypair_config: Option<KeypairConfig>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::adopted(cloud, config, Some(image_config), keypair_config))
    }

    /// Creator for a server found on the platform. The descriptor is taken
    /// as reconstructed: its image, networks or subnets may be unresolved,
    /// which only matters if `create()` is called.
    pub(crate) fn adopted(
        cloud: Cloud,
        config: VmInstanceConfig,
        image_config: Option<ImageConfig>,
        keypair_config: Option<KeypairConfig>,
    ) -> Self {
        Self {
            cloud,
            config,
            image_config,
            keypair_config,
            server: None,
            ports: Vec::new(),
            floating_ips: Vec::new(),
        }
    }

    pub fn image_config(&self) -> Option<&ImageConfig> {
        self.image_config.as_ref()
    }

    pub fn keypair_config(&self) -> Option<&KeypairConfig> {
        self.keypair_config.as_ref()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn floating_ips(&self) -> &[FloatingIp] {
        &self.floating_ips
    }

    /// Whether the held server reached ACTIVE. ERROR raises
    /// [`CloudError::CreationFailed`].
    pub async fn vm_active(&self, blocking: bool) -> Result<bool> {
        let server = self.held()?;
        let compute = &self.cloud.compute;
        let id = server.id.as_str();

        StatusPoller::with_timeout_secs(self.config.vm_boot_timeout)
            .blocking(blocking)
            .wait_for(
                || async move { compute.get_server(id).await.map(|s| s.status) },
                |status| status == VM_ACTIVE,
                |status| status == VM_ERROR,
                creation_failed(Server::KIND, &self.config.name),
            )
            .await
    }

    /// Whether the held server is gone; true when nothing is held.
    pub async fn vm_deleted(&self, blocking: bool) -> Result<bool> {
        match &self.server {
            Some(server) => self.wait_deleted(server, blocking).await,
            None => Ok(true),
        }
    }

    async fn wait_deleted(&self, server: &Server, blocking: bool) -> Result<bool> {
        let compute = &self.cloud.compute;
        let id = server.id.as_str();

        StatusPoller::with_timeout_secs(self.config.vm_delete_timeout)
            .blocking(blocking)
            .wait_for(
                || async move {
                    optional(compute.get_server(id).await)
                        .map(|s| s.map_or_else(|| VM_DELETED.to_string(), |s| s.status))
                },
                |status| status == VM_DELETED,
                |status| status == VM_ERROR,
                delete_failed(Server::KIND, &self.config.name),
            )
            .await
    }

    fn held(&self) -> Result<&Server> {
        self.server.as_ref().ok_or_else(|| {
            CloudError::not_found(format!("VM instance {} is not held", self.config.name))
        })
    }

    async fn create_port(&self, config: &PortConfig) -> Result<Port> {
        config.creatable()?;
        let network_name = config.network_name.as_deref().unwrap_or_default();
        let network = self
            .cloud
            .network
            .find_network(network_name, None)
            .await?
            .ok_or_else(|| CloudError::not_found(format!("network {}", network_name)))?;

        let mut fixed_ips = Vec::with_capacity(config.ip_addrs.len());
        for ip in &config.ip_addrs {
            let subnet_name = ip.subnet_name.as_deref().unwrap_or_default();
            let subnet = self
                .cloud
                .network
                .find_subnet(subnet_name)
                .await?
                .ok_or_else(|| CloudError::not_found(format!("subnet {}", subnet_name)))?;
            fixed_ips.push(FixedIp {
                subnet_id: subnet.id,
                ip_address: ip.ip.clone(),
            });
        }

        info!("Creating port {} on network {}", config.name, network.name);
        self.cloud
            .network
            .create_port(&network, config, &fixed_ips)
            .await
    }

    async fn associate_floating_ip(&self, config: &FloatingIpConfig) -> Result<FloatingIp> {
        let port = self
            .ports
            .iter()
            .find(|p| {
                config.port_name.as_deref() == Some(p.name.as_str())
                    || config.port_id.as_deref() == Some(p.id.as_str())
            })
            .ok_or_else(|| {
                CloudError::not_found(format!("port for floating IP {}", config.name))
            })?;

        let router_name = config.router_name.as_deref().ok_or_else(|| {
            ConfigError::FloatingIp(format!(
                "the attribute router_name is required to create floating IP {}",
                config.name
            ))
        })?;
        let router = self
            .cloud
            .network
            .find_router(router_name)
            .await?
            .ok_or_else(|| CloudError::not_found(format!("router {}", router_name)))?;
        let external_network_id = router.external_network_id.as_deref().ok_or_else(|| {
            CloudError::Api(format!("router {} has no external gateway", router.name))
        })?;

        let fixed_ip = match &config.subnet_name {
            Some(subnet_name) => {
                let subnet = self
                    .cloud
                    .network
                    .find_subnet(subnet_name)
                    .await?
                    .ok_or_else(|| CloudError::not_found(format!("subnet {}", subnet_name)))?;
                port.fixed_ips
                    .iter()
                    .find(|ip| ip.subnet_id == subnet.id)
                    .map(|ip| ip.ip_address.clone())
            }
            None => None,
        };

        info!("Associating floating IP {} with port {}", config.name, port.name);
        self.cloud
            .network
            .create_floating_ip(external_network_id, port, fixed_ip.as_deref())
            .await
    }
}

#[async_trait]
impl ResourceCreator for VmInstanceCreator {
    type Config = VmInstanceConfig;
    type Handle = Server;

    fn config(&self) -> &VmInstanceConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Server>> {
        debug!("Looking up VM instance: {}", self.config.name);
        self.server = self.cloud.compute.find_server(&self.config.name).await?;
        self.ports.clear();
        self.floating_ips.clear();

        if let Some(server) = &self.server {
            self.ports = self
                .cloud
                .network
                .list_ports(&PortFilter::device(&server.id))
                .await?;
            let port_ids: Vec<String> = self.ports.iter().map(|p| p.id.clone()).collect();
            self.floating_ips = self.cloud.network.list_floating_ips(&port_ids).await?;
        }
        Ok(self.server.clone())
    }

    async fn create(&mut self) -> Result<Server> {
        if let Some(server) = self.initialize().await? {
            return Ok(server);
        }

        self.config.validate()?;
        for port_config in &self.config.port_settings {
            port_config.creatable()?;
        }

        let flavor = self
            .cloud
            .compute
            .find_flavor(&self.config.flavor)
            .await?
            .ok_or_else(|| CloudError::not_found(format!("flavor {}", self.config.flavor)))?;
        let image_name = match &self.image_config {
            Some(image_config) => image_config.name.as_str(),
            None => {
                return Err(ConfigError::VmInstance(format!(
                    "no image configured for {}",
                    self.config.name
                ))
                .into());
            }
        };
        let image = self
            .cloud
            .image
            .find_image(image_name)
            .await?
            .ok_or_else(|| CloudError::not_found(format!("image {}", image_name)))?;

        for port_config in &self.config.port_settings {
            let port = self.create_port(port_config).await?;
            self.ports.push(port);
        }

        let request = ServerRequest {
            name: self.config.name.clone(),
            flavor_id: flavor.id,
            image_id: image.id,
            keypair_name: self.keypair_config.as_ref().map(|k| k.name.clone()),
            port_ids: self.ports.iter().map(|p| p.id.clone()).collect(),
            security_group_names: self.config.security_group_names.clone(),
            availability_zone: self.config.availability_zone.clone(),
            userdata: self.config.userdata.clone(),
        };
        info!("Creating VM instance: {}", self.config.name);
        let server = self.cloud.compute.create_server(&request).await?;
        let id = server.id.clone();
        self.server = Some(server);

        if !self.vm_active(true).await? {
            let status = match self.cloud.compute.get_server(&id).await {
                Ok(server) => server.status,
                Err(e) => e.to_string(),
            };
            return Err(creation_timeout(Server::KIND, &self.config.name, status));
        }
        let server = self.cloud.compute.get_server(&id).await?;
        self.server = Some(server.clone());

        for fip_config in &self.config.floating_ip_settings {
            if !fip_config.provisioning {
                continue;
            }
            let floating_ip = self.associate_floating_ip(fip_config).await?;
            self.floating_ips.push(floating_ip);
        }
        Ok(server)
    }

    async fn clean(&mut self) -> Result<()> {
        let mut errors = Vec::new();

        for floating_ip in std::mem::take(&mut self.floating_ips) {
            debug!("Deleting floating IP {}", floating_ip.floating_ip_address);
            if let Err(e) =
                ignore_not_found(self.cloud.network.delete_floating_ip(&floating_ip).await)
            {
                warn!("Failed to delete floating IP {}: {}", floating_ip.floating_ip_address, e);
                errors.push(e);
            }
        }

        if let Some(server) = self.server.take() {
            info!("Deleting VM instance: {}", server.name);
            match ignore_not_found(self.cloud.compute.delete_server(&server).await) {
                Ok(()) => match self.wait_deleted(&server, true).await {
                    Ok(true) => {}
                    Ok(false) => warn!(
                        "VM instance {} still present after {}s",
                        server.name, self.config.vm_delete_timeout
                    ),
                    Err(e) => errors.push(e),
                },
                Err(e) => errors.push(e),
            }
        }

        for port in std::mem::take(&mut self.ports) {
            debug!("Deleting port {}", port.name);
            if let Err(e) = ignore_not_found(self.cloud.network.delete_port(&port).await) {
                warn!("Failed to delete port {}: {}", port.name, e);
                errors.push(e);
            }
        }

        match errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn get(&self) -> Option<&Server> {
        self.server.as_ref()
    }
}
