//! Image descriptor

use super::{Descriptor, require, require_opt};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Glance image descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub name: String,

    /// Default login user baked into the image
    pub image_user: Option<String>,

    /// Disk format (qcow2, raw, ...)
    pub img_format: Option<String>,

    /// Download location; mutually usable with `image_file`
    pub url: Option<String>,

    /// Local file to upload
    pub image_file: Option<PathBuf>,

    pub extra_properties: HashMap<String, String>,

    pub kernel_image: Option<Box<ImageConfig>>,

    pub ramdisk_image: Option<Box<ImageConfig>>,

    /// Only adopt; never upload. Creation fails if the image is absent.
    pub exists: bool,

    pub public: bool,
}

impl ImageConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Descriptor for an image that must already exist on the platform.
    pub fn existing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: true,
            ..Default::default()
        }
    }
}

impl Descriptor for ImageConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Image)?;

        if !self.exists {
            require_opt(&self.image_user, "image_user", ConfigError::Image)?;
            require_opt(&self.img_format, "img_format", ConfigError::Image)?;
            if self.url.is_none() && self.image_file.is_none() {
                return Err(ConfigError::Image(
                    "URL or image file must be set or image must already exist".to_string(),
                ));
            }
        }

        if let Some(kernel) = &self.kernel_image {
            kernel.validate()?;
        }
        if let Some(ramdisk) = &self.ramdisk_image {
            ramdisk.validate()?;
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Image(message.into())
    }
}
