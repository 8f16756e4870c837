//! Router creator

use async_trait::async_trait;
use stackflow_cloud::{
    Cloud, CloudError, ResourceCreator, Result, Router, Subnet, ignore_not_found,
};
use stackflow_core::{Descriptor, RouterConfig};
use tracing::{debug, info, warn};

pub struct RouterCreator {
    cloud: Cloud,
    config: RouterConfig,
    router: Option<Router>,
    /// Subnets attached as router interfaces
    interfaces: Vec<Subnet>,
}

impl RouterCreator {
    pub fn new(cloud: Cloud, config: RouterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            router: None,
            interfaces: Vec::new(),
        })
    }

    pub fn interfaces(&self) -> &[Subnet] {
        &self.interfaces
    }

    async fn subnet(&self, name: &str) -> Result<Subnet> {
        self.cloud
            .network
            .find_subnet(name)
            .await?
            .ok_or_else(|| CloudError::not_found(format!("subnet {}", name)))
    }

    async fn gateway_network_id(&self) -> Result<Option<String>> {
        let Some(name) = &self.config.external_gateway else {
            return Ok(None);
        };
        match self.cloud.network.find_network(name, None).await? {
            Some(network) => Ok(Some(network.id)),
            None => Err(CloudError::not_found(format!("external network {}", name))),
        }
    }
}

#[async_trait]
impl ResourceCreator for RouterCreator {
    type Config = RouterConfig;
    type Handle = Router;

    fn config(&self) -> &RouterConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Router>> {
        debug!("Looking up router: {}", self.config.name);
        self.router = self.cloud.network.find_router(&self.config.name).await?;
        self.interfaces.clear();
        if self.router.is_some() {
            for name in &self.config.internal_subnets {
                if let Some(subnet) = self.cloud.network.find_subnet(name).await? {
                    self.interfaces.push(subnet);
                }
            }
        }
        Ok(self.router.clone())
    }

    async fn create(&mut self) -> Result<Router> {
        if let Some(router) = self.initialize().await? {
            return Ok(router);
        }

        let gateway = self.gateway_network_id().await?;
        info!("Creating router: {}", self.config.name);
        let router = self
            .cloud
            .network
            .create_router(&self.config, gateway.as_deref())
            .await?;
        self.router = Some(router.clone());

        for name in &self.config.internal_subnets {
            let subnet = self.subnet(name).await?;
            info!("Adding interface for subnet {} to router {}", subnet.name, router.name);
            self.cloud
                .network
                .add_router_interface(&router, &subnet)
                .await?;
            self.interfaces.push(subnet);
        }
        Ok(router)
    }

    async fn clean(&mut self) -> Result<()> {
        let interfaces = std::mem::take(&mut self.interfaces);
        let Some(router) = self.router.take() else {
            return Ok(());
        };

        let mut result = Ok(());
        for subnet in interfaces {
            debug!("Removing interface for subnet {} from router {}", subnet.name, router.name);
            if let Err(e) = ignore_not_found(
                self.cloud
                    .network
                    .remove_router_interface(&router, &subnet)
                    .await,
            ) {
                warn!("Failed to remove router interface {}: {}", subnet.name, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        info!("Deleting router: {}", router.name);
        result.and(ignore_not_found(
            self.cloud.network.delete_router(&router).await,
        ))
    }

    fn get(&self) -> Option<&Router> {
        self.router.as_ref()
    }
}
