//! Flavor creator

use async_trait::async_trait;
use stackflow_cloud::{Cloud, Flavor, ResourceCreator, Result, ignore_not_found};
use stackflow_core::{Descriptor, FlavorConfig};
use tracing::{debug, info};

pub struct FlavorCreator {
    cloud: Cloud,
    config: FlavorConfig,
    flavor: Option<Flavor>,
}

impl FlavorCreator {
    pub fn new(cloud: Cloud, config: FlavorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            flavor: None,
        })
    }
}

#[async_trait]
impl ResourceCreator for FlavorCreator {
    type Config = FlavorConfig;
    type Handle = Flavor;

    fn config(&self) -> &FlavorConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Flavor>> {
        debug!("Looking up flavor: {}", self.config.name);
        self.flavor = self.cloud.compute.find_flavor(&self.config.name).await?;
        Ok(self.flavor.clone())
    }

    async fn create(&mut self) -> Result<Flavor> {
        if let Some(flavor) = self.initialize().await? {
            return Ok(flavor);
        }
        info!("Creating flavor: {}", self.config.name);
        let flavor = self.cloud.compute.create_flavor(&self.config).await?;
        self.flavor = Some(flavor.clone());
        Ok(flavor)
    }

    async fn clean(&mut self) -> Result<()> {
        let Some(flavor) = self.flavor.take() else {
            return Ok(());
        };
        info!("Deleting flavor: {}", flavor.name);
        ignore_not_found(self.cloud.compute.delete_flavor(&flavor).await)
    }

    fn get(&self) -> Option<&Flavor> {
        self.flavor.as_ref()
    }
}
