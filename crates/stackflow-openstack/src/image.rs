//! Image creator

use crate::status::{
    IMAGE_ACTIVE, IMAGE_ACTIVE_TIMEOUT, IMAGE_KILLED, creation_failed, creation_timeout,
};
use async_trait::async_trait;
use stackflow_cloud::{
    Cloud, CloudError, Image, RemoteResource, ResourceCreator, Result, StatusPoller,
    ignore_not_found,
};
use stackflow_core::{Descriptor, ImageConfig};
use tracing::{debug, info, warn};

pub struct ImageCreator {
    cloud: Cloud,
    config: ImageConfig,
    image: Option<Image>,
    /// Kernel and ramdisk images uploaded alongside this one
    companions: Vec<ImageCreator>,
}

impl ImageCreator {
    pub fn new(cloud: Cloud, config: ImageConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            image: None,
            companions: Vec::new(),
        })
    }

    /// Creates the image, waiting for it to become active only when
    /// `blocking` is set.
    pub async fn create_with(&mut self, blocking: bool) -> Result<Image> {
        if let Some(image) = self.initialize().await? {
            return Ok(image);
        }
        if self.config.exists {
            return Err(CloudError::not_found(format!(
                "image {} is marked as existing but was not found",
                self.config.name
            )));
        }

        let mut request = self.config.clone();
        for (property, companion) in [
            ("kernel_id", self.config.kernel_image.as_deref()),
            ("ramdisk_id", self.config.ramdisk_image.as_deref()),
        ] {
            let Some(companion) = companion else {
                continue;
            };
            let mut creator = ImageCreator::new(self.cloud.clone(), companion.clone())?;
            let image = creator.create().await?;
            request
                .extra_properties
                .insert(property.to_string(), image.id.clone());
            self.companions.push(creator);
        }

        info!("Creating image: {}", self.config.name);
        let image = self.cloud.image.create_image(&request).await?;
        self.image = Some(image);

        if blocking {
            if !self.image_active(true).await? {
                let status = self.current_status().await;
                return Err(creation_timeout(Image::KIND, &self.config.name, status));
            }
            self.refresh().await?;
        }

        self.image
            .clone()
            .ok_or_else(|| CloudError::not_found(format!("image {}", self.config.name)))
    }

    /// Whether the held image reached `active`.
    ///
    /// With `blocking` false this is a single status check. A `killed`
    /// image raises [`CloudError::CreationFailed`].
    pub async fn image_active(&self, blocking: bool) -> Result<bool> {
        let image = self.held()?;
        let images = &self.cloud.image;
        let id = image.id.as_str();

        StatusPoller::with_timeout_secs(IMAGE_ACTIVE_TIMEOUT)
            .blocking(blocking)
            .wait_for(
                || async move { images.get_image(id).await.map(|image| image.status) },
                |status| status.eq_ignore_ascii_case(IMAGE_ACTIVE),
                |status| status.eq_ignore_ascii_case(IMAGE_KILLED),
                creation_failed(Image::KIND, &self.config.name),
            )
            .await
    }

    fn held(&self) -> Result<&Image> {
        self.image
            .as_ref()
            .ok_or_else(|| CloudError::not_found(format!("image {} is not held", self.config.name)))
    }

    async fn refresh(&mut self) -> Result<()> {
        let id = self.held()?.id.clone();
        self.image = Some(self.cloud.image.get_image(&id).await?);
        Ok(())
    }

    async fn current_status(&self) -> String {
        match self.held() {
            Ok(image) => match self.cloud.image.get_image(&image.id).await {
                Ok(image) => image.status,
                Err(e) => e.to_string(),
            },
            Err(_) => "unknown".to_string(),
        }
    }
}

#[async_trait]
impl ResourceCreator for ImageCreator {
    type Config = ImageConfig;
    type Handle = Image;

    fn config(&self) -> &ImageConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Image>> {
        debug!("Looking up image: {}", self.config.name);
        self.image = self.cloud.image.find_image(&self.config.name).await?;
        Ok(self.image.clone())
    }

    async fn create(&mut self) -> Result<Image> {
        self.create_with(true).await
    }

    async fn clean(&mut self) -> Result<()> {
        let mut result = Ok(());
        if let Some(image) = self.image.take() {
            info!("Deleting image: {}", image.name);
            result = ignore_not_found(self.cloud.image.delete_image(&image).await);
        }
        for mut companion in self.companions.drain(..) {
            if let Err(e) = companion.clean().await {
                warn!("Failed to delete image {}: {}", companion.config.name, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    fn get(&self) -> Option<&Image> {
        self.image.as_ref()
    }
}
