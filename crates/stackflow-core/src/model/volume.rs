//! Cinder volume and volume type descriptors

use super::{Descriptor, require};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub name: String,
    pub project_name: Option<String>,
    pub description: Option<String>,
    /// Size in GB
    pub size: u32,
    pub image_name: Option<String>,
    pub type_name: Option<String>,
    pub availability_zone: Option<String>,
    pub multi_attach: bool,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            project_name: None,
            description: None,
            size: 1,
            image_name: None,
            type_name: None,
            availability_zone: None,
            multi_attach: false,
        }
    }
}

impl VolumeConfig {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            ..Default::default()
        }
    }
}

impl Descriptor for VolumeConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::Volume)?;
        if self.size == 0 {
            return Err(ConfigError::Volume(
                "size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::Volume(message.into())
    }
}

/// Where volume encryption is performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlLocation {
    #[default]
    FrontEnd,
    BackEnd,
}

impl std::fmt::Display for ControlLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlLocation::FrontEnd => write!(f, "front-end"),
            ControlLocation::BackEnd => write!(f, "back-end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeTypeEncryptionConfig {
    pub name: String,
    pub provider_class: String,
    #[serde(default)]
    pub control_location: ControlLocation,
    #[serde(default)]
    pub cipher: Option<String>,
    #[serde(default)]
    pub key_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeTypeConfig {
    pub name: String,
    pub description: Option<String>,
    pub encryption: Option<VolumeTypeEncryptionConfig>,
    pub qos_spec_name: Option<String>,
    pub public: bool,
}

impl VolumeTypeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Descriptor for VolumeTypeConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<()> {
        require(&self.name, "name", ConfigError::VolumeType)?;
        if let Some(encryption) = &self.encryption {
            require(&encryption.name, "encryption.name", ConfigError::VolumeType)?;
            require(
                &encryption.provider_class,
                "encryption.provider_class",
                ConfigError::VolumeType,
            )?;
        }
        Ok(())
    }

    fn invalid(message: impl Into<String>) -> ConfigError {
        ConfigError::VolumeType(message.into())
    }
}
