//! Network creator (network plus its subnets)

use async_trait::async_trait;
use stackflow_cloud::{Cloud, CloudError, Network, ResourceCreator, Result, Subnet, ignore_not_found};
use stackflow_core::{Descriptor, NetworkConfig};
use tracing::{debug, info, warn};

pub struct NetworkCreator {
    cloud: Cloud,
    config: NetworkConfig,
    network: Option<Network>,
    subnets: Vec<Subnet>,
}

impl NetworkCreator {
    pub fn new(cloud: Cloud, config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            network: None,
            subnets: Vec::new(),
        })
    }

    /// Subnets of the held network
    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    async fn project_id(&self) -> Result<Option<String>> {
        let Some(project_name) = &self.config.project_name else {
            return Ok(None);
        };
        let domain = self.cloud.creds().project_domain_name.as_str();
        match self.cloud.identity.find_project(project_name, domain).await? {
            Some(project) => Ok(Some(project.id)),
            None => Err(CloudError::not_found(format!("project {}", project_name))),
        }
    }
}

#[async_trait]
impl ResourceCreator for NetworkCreator {
    type Config = NetworkConfig;
    type Handle = Network;

    fn config(&self) -> &NetworkConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Network>> {
        debug!("Looking up network: {}", self.config.name);
        let project_id = self.project_id().await?;
        self.network = self
            .cloud
            .network
            .find_network(&self.config.name, project_id.as_deref())
            .await?;
        self.subnets = match &self.network {
            Some(network) => self.cloud.network.list_subnets(&network.id).await?,
            None => Vec::new(),
        };
        Ok(self.network.clone())
    }

    async fn create(&mut self) -> Result<Network> {
        if let Some(network) = self.initialize().await? {
            return Ok(network);
        }

        info!("Creating network: {}", self.config.name);
        let network = self.cloud.network.create_network(&self.config).await?;
        self.network = Some(network.clone());

        for subnet in &self.config.subnets {
            info!("Creating subnet {} on network {}", subnet.name, network.name);
            let subnet = self.cloud.network.create_subnet(&network, subnet).await?;
            self.subnets.push(subnet);
        }
        Ok(network)
    }

    async fn clean(&mut self) -> Result<()> {
        let mut result = Ok(());
        for subnet in std::mem::take(&mut self.subnets) {
            info!("Deleting subnet: {}", subnet.name);
            if let Err(e) = ignore_not_found(self.cloud.network.delete_subnet(&subnet).await) {
                warn!("Failed to delete subnet {}: {}", subnet.name, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        if let Some(network) = self.network.take() {
            info!("Deleting network: {}", network.name);
            result = result.and(ignore_not_found(
                self.cloud.network.delete_network(&network).await,
            ));
        }
        result
    }

    fn get(&self) -> Option<&Network> {
        self.network.as_ref()
    }
}
