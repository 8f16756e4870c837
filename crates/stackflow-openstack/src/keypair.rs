//! Keypair creator and local key file handling

use async_trait::async_trait;
use stackflow_cloud::{Cloud, Keypair, ResourceCreator, Result, ignore_not_found};
use stackflow_core::{Descriptor, KeypairConfig};
use std::path::Path;
use tracing::{debug, info, warn};

pub struct KeypairCreator {
    cloud: Cloud,
    config: KeypairConfig,
    keypair: Option<Keypair>,
}

impl KeypairCreator {
    pub fn new(cloud: Cloud, config: KeypairConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            keypair: None,
        })
    }

    /// Public key text from `public_filepath`, when that file exists.
    async fn existing_public_key(&self) -> Result<Option<String>> {
        let Some(path) = &self.config.public_filepath else {
            return Ok(None);
        };
        if !tokio::fs::try_exists(path).await? {
            return Ok(None);
        }
        debug!("Using public key from {}", path.display());
        Ok(Some(tokio::fs::read_to_string(path).await?))
    }

    async fn remove_key_files(&self) {
        let paths = [&self.config.private_filepath, &self.config.public_filepath];
        for path in paths.into_iter().flatten() {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!("Removed key file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove key file {}: {}", path.display(), e),
            }
        }
    }
}

/// Writes a private key readable by the owner only.
pub(crate) async fn write_private_key(path: &Path, pem: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, pem).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    debug!("Wrote private key to {}", path.display());
    Ok(())
}

#[async_trait]
impl ResourceCreator for KeypairCreator {
    type Config = KeypairConfig;
    type Handle = Keypair;

    fn config(&self) -> &KeypairConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Keypair>> {
        debug!("Looking up keypair: {}", self.config.name);
        self.keypair = self.cloud.compute.find_keypair(&self.config.name).await?;
        Ok(self.keypair.clone())
    }

    async fn create(&mut self) -> Result<Keypair> {
        if let Some(keypair) = self.initialize().await? {
            return Ok(keypair);
        }

        let public_key = self.existing_public_key().await?;
        info!("Creating keypair: {}", self.config.name);
        let keypair = self
            .cloud
            .compute
            .create_keypair(&self.config.name, public_key.as_deref())
            .await?;
        self.keypair = Some(keypair.clone());

        if public_key.is_none() {
            if let (Some(path), Some(pem)) = (&self.config.private_filepath, &keypair.private_key)
            {
                write_private_key(path, pem).await?;
            }
            if let Some(path) = &self.config.public_filepath {
                tokio::fs::write(path, &keypair.public_key).await?;
            }
        }
        Ok(keypair)
    }

    async fn clean(&mut self) -> Result<()> {
        let result = match self.keypair.take() {
            Some(keypair) => {
                info!("Deleting keypair: {}", keypair.name);
                ignore_not_found(self.cloud.compute.delete_keypair(&keypair).await)
            }
            None => Ok(()),
        };
        if self.config.delete_on_clean {
            self.remove_key_files().await;
        }
        result
    }

    fn get(&self) -> Option<&Keypair> {
        self.keypair.as_ref()
    }
}
