//! Volume and volume type creators

use crate::status::{
    VOLUME_AVAILABLE, VOLUME_DELETED, VOLUME_ERROR, VOLUME_TIMEOUT, creation_failed,
    creation_timeout, delete_failed, never,
};
use async_trait::async_trait;
use stackflow_cloud::{
    Cloud, CloudError, RemoteResource, ResourceCreator, Result, StatusPoller, Volume, VolumeType,
    ignore_not_found, optional,
};
use stackflow_core::{Descriptor, VolumeConfig, VolumeTypeConfig};
use tracing::{debug, info, warn};

pub struct VolumeCreator {
    cloud: Cloud,
    config: VolumeConfig,
    volume: Option<Volume>,
}

impl VolumeCreator {
    pub fn new(cloud: Cloud, config: VolumeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            volume: None,
        })
    }

    /// Whether the held volume reached `available`.
    pub async fn volume_active(&self, blocking: bool) -> Result<bool> {
        let volume = self.held()?;
        let volumes = &self.cloud.volume;
        let id = volume.id.as_str();

        StatusPoller::with_timeout_secs(VOLUME_TIMEOUT)
            .blocking(blocking)
            .wait_for(
                || async move { volumes.get_volume(id).await.map(|v| v.status) },
                |status| status == VOLUME_AVAILABLE,
                |status| status == VOLUME_ERROR,
                creation_failed(Volume::KIND, &self.config.name),
            )
            .await
    }

    fn held(&self) -> Result<&Volume> {
        self.volume
            .as_ref()
            .ok_or_else(|| CloudError::not_found(format!("volume {} is not held", self.config.name)))
    }

    async fn wait_deleted(&self, volume: &Volume) -> Result<bool> {
        let volumes = &self.cloud.volume;
        let id = volume.id.as_str();

        StatusPoller::with_timeout_secs(VOLUME_TIMEOUT)
            .wait_for(
                || async move {
                    optional(volumes.get_volume(id).await)
                        .map(|v| v.map_or_else(|| VOLUME_DELETED.to_string(), |v| v.status))
                },
                |status| status == VOLUME_DELETED,
                never,
                delete_failed(Volume::KIND, &self.config.name),
            )
            .await
    }
}

#[async_trait]
impl ResourceCreator for VolumeCreator {
    type Config = VolumeConfig;
    type Handle = Volume;

    fn config(&self) -> &VolumeConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Volume>> {
        debug!("Looking up volume: {}", self.config.name);
        self.volume = self.cloud.volume.find_volume(&self.config.name).await?;
        Ok(self.volume.clone())
    }

    async fn create(&mut self) -> Result<Volume> {
        if let Some(volume) = self.initialize().await? {
            return Ok(volume);
        }

        let image_id = match &self.config.image_name {
            Some(name) => match self.cloud.image.find_image(name).await? {
                Some(image) => Some(image.id),
                None => return Err(CloudError::not_found(format!("image {}", name))),
            },
            None => None,
        };

        info!("Creating volume: {}", self.config.name);
        let volume = self
            .cloud
            .volume
            .create_volume(&self.config, image_id.as_deref())
            .await?;
        let id = volume.id.clone();
        self.volume = Some(volume);

        if !self.volume_active(true).await? {
            let status = match self.cloud.volume.get_volume(&id).await {
                Ok(volume) => volume.status,
                Err(e) => e.to_string(),
            };
            return Err(creation_timeout(Volume::KIND, &self.config.name, status));
        }

        let volume = self.cloud.volume.get_volume(&id).await?;
        self.volume = Some(volume.clone());
        Ok(volume)
    }

    async fn clean(&mut self) -> Result<()> {
        let Some(volume) = self.volume.take() else {
            return Ok(());
        };
        info!("Deleting volume: {}", volume.name);
        match self.cloud.volume.delete_volume(&volume).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        }
        if !self.wait_deleted(&volume).await? {
            warn!("Volume {} still present after {}s", volume.name, VOLUME_TIMEOUT);
        }
        Ok(())
    }

    fn get(&self) -> Option<&Volume> {
        self.volume.as_ref()
    }
}

pub struct VolumeTypeCreator {
    cloud: Cloud,
    config: VolumeTypeConfig,
    volume_type: Option<VolumeType>,
}

impl VolumeTypeCreator {
    pub fn new(cloud: Cloud, config: VolumeTypeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            volume_type: None,
        })
    }
}

#[async_trait]
impl ResourceCreator for VolumeTypeCreator {
    type Config = VolumeTypeConfig;
    type Handle = VolumeType;

    fn config(&self) -> &VolumeTypeConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<VolumeType>> {
        debug!("Looking up volume type: {}", self.config.name);
        self.volume_type = self.cloud.volume.find_volume_type(&self.config.name).await?;
        Ok(self.volume_type.clone())
    }

    async fn create(&mut self) -> Result<VolumeType> {
        if let Some(volume_type) = self.initialize().await? {
            return Ok(volume_type);
        }
        info!("Creating volume type: {}", self.config.name);
        let volume_type = self.cloud.volume.create_volume_type(&self.config).await?;
        self.volume_type = Some(volume_type.clone());
        Ok(volume_type)
    }

    async fn clean(&mut self) -> Result<()> {
        let Some(volume_type) = self.volume_type.take() else {
            return Ok(());
        };
        info!("Deleting volume type: {}", volume_type.name);
        ignore_not_found(self.cloud.volume.delete_volume_type(&volume_type).await)
    }

    fn get(&self) -> Option<&VolumeType> {
        self.volume_type.as_ref()
    }
}
