//! Heat stack lifecycle
//!
//! ```text
//! ABSENT ── create ──▶ CREATING ──▶ CREATE_COMPLETE
//!                          └──────▶ CREATE_FAILED   (fatal, children logged)
//! CREATE_COMPLETE ── clean ──▶ DELETING ──▶ ABSENT
//!                                  └──▶ DELETE_FAILED ── clean VMs, delete again ──▶ ABSENT | Cleanup error
//! ```

use crate::flavor::FlavorCreator;
use crate::graph::{self, types};
use crate::keypair::KeypairCreator;
use crate::network::NetworkCreator;
use crate::reconstruct;
use crate::router::RouterCreator;
use crate::status::{
    STACK_CREATE_COMPLETE, STACK_CREATE_FAILED, STACK_DELETE_COMPLETE, STACK_DELETE_FAILED,
    STACK_DELETE_TIMEOUT, creation_timeout, delete_failed,
};
use crate::vm::VmInstanceCreator;
use crate::volume::{VolumeCreator, VolumeTypeCreator};
use async_trait::async_trait;
use stackflow_cloud::{
    Cloud, CloudError, RemoteResource, ResourceCreator, ResourceNode, Result, Stack, StackOutput,
    StatusPoller, optional,
};
use stackflow_core::{Descriptor, ImageConfig, KeypairConfig, StackConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct StackCreator {
    cloud: Cloud,
    config: StackConfig,
    stack: Option<Stack>,
    /// Descriptors matched against images of adopted servers
    image_configs: Vec<ImageConfig>,
    /// Descriptors matched against keypairs of adopted servers
    keypair_configs: Vec<KeypairConfig>,
    /// Where private keys recovered from stack outputs are written
    key_dir: PathBuf,
    poll_interval: Duration,
}

impl StackCreator {
    pub fn new(cloud: Cloud, config: StackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cloud,
            config,
            stack: None,
            image_configs: Vec::new(),
            keypair_configs: Vec::new(),
            key_dir: default_key_dir(),
            poll_interval: stackflow_cloud::POLL_INTERVAL,
        })
    }

    pub fn with_image_configs(mut self, configs: Vec<ImageConfig>) -> Self {
        self.image_configs = configs;
        self
    }

    pub fn with_keypair_configs(mut self, configs: Vec<KeypairConfig>) -> Self {
        self.keypair_configs = configs;
        self
    }

    pub fn with_key_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.key_dir = dir.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn held(&self) -> Result<&Stack> {
        self.stack
            .as_ref()
            .ok_or_else(|| CloudError::not_found(format!("stack {} is not held", self.config.name)))
    }

    fn poller(&self, timeout_secs: u64, blocking: bool) -> StatusPoller {
        StatusPoller::new(Duration::from_secs(timeout_secs), self.poll_interval).blocking(blocking)
    }

    /// Whether the held stack reached CREATE_COMPLETE.
    ///
    /// CREATE_FAILED logs every child resource that did not complete and
    /// raises [`CloudError::CreationFailed`] carrying those children.
    pub async fn stack_complete(&self, blocking: bool) -> Result<bool> {
        let stack = self.held()?;
        let orchestration = &self.cloud.orchestration;
        let id = stack.id.as_str();

        self.poller(self.config.stack_create_timeout, blocking)
            .wait_for(
                || async move { orchestration.get_stack(id).await.map(|s| s.status) },
                |status| status == STACK_CREATE_COMPLETE,
                |status| status == STACK_CREATE_FAILED,
                |status| self.creation_failure(id, status),
            )
            .await
    }

    /// Whether the stack is gone: DELETE_COMPLETE or no longer found.
    /// True when nothing is held.
    pub async fn stack_deleted(&self, blocking: bool) -> Result<bool> {
        match &self.stack {
            Some(stack) => self.wait_deleted(&stack.id, blocking).await,
            None => Ok(true),
        }
    }

    async fn wait_deleted(&self, stack_id: &str, blocking: bool) -> Result<bool> {
        let orchestration = &self.cloud.orchestration;

        self.poller(STACK_DELETE_TIMEOUT, blocking)
            .wait_for(
                || async move {
                    optional(orchestration.get_stack(stack_id).await).map(|s| {
                        s.map_or_else(|| STACK_DELETE_COMPLETE.to_string(), |s| s.status)
                    })
                },
                |status| status == STACK_DELETE_COMPLETE,
                |status| status == STACK_DELETE_FAILED,
                delete_failed(Stack::KIND, &self.config.name),
            )
            .await
    }

    async fn creation_failure(&self, stack_id: &str, status: String) -> CloudError {
        let children = match graph::all_resources(self.cloud.orchestration.as_ref(), stack_id).await
        {
            Ok(resources) => resources
                .into_iter()
                .filter(|r| r.status != STACK_CREATE_COMPLETE)
                .collect::<Vec<ResourceNode>>(),
            Err(e) => {
                warn!("Could not list resources of failed stack {}: {}", self.config.name, e);
                Vec::new()
            }
        };
        for child in &children {
            error!(
                stack = %self.config.name,
                resource = %child.name,
                resource_type = %child.resource_type,
                status = %child.status,
                reason = child.status_reason.as_deref().unwrap_or(""),
                "Stack resource did not complete"
            );
        }
        CloudError::CreationFailed {
            kind: Stack::KIND,
            name: self.config.name.clone(),
            status,
            children,
        }
    }

    /// Issues a delete and waits for it. Any failure counts as not deleted.
    async fn delete_and_wait(&self, stack: &Stack) -> bool {
        match self.cloud.orchestration.delete_stack(stack).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return true,
            Err(e) => {
                warn!("Delete request for stack {} failed: {}", stack.name, e);
                return false;
            }
        }
        match self.wait_deleted(&stack.id, true).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    /// Outputs declared by the template, as reported by the platform.
    pub async fn outputs(&self) -> Result<Vec<StackOutput>> {
        let stack = self.held()?;
        self.cloud.orchestration.list_outputs(&stack.id).await
    }

    async fn nodes(&self, resource_type: &str) -> Result<Vec<ResourceNode>> {
        let stack = self.held()?;
        graph::flatten(self.cloud.orchestration.as_ref(), &stack.id, resource_type).await
    }

    pub async fn get_network_creators(&self) -> Result<Vec<NetworkCreator>> {
        let mut creators = Vec::new();
        for node in self.nodes(types::NETWORK).await? {
            let network = self.cloud.network.get_network(&node.id).await?;
            let subnets = self.cloud.network.list_subnets(&network.id).await?;
            let config = reconstruct::network_config(&network, &subnets);
            let mut creator = NetworkCreator::new(self.cloud.clone(), config)?;
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    pub async fn get_router_creators(&self) -> Result<Vec<RouterCreator>> {
        let mut creators = Vec::new();
        for node in self.nodes(types::ROUTER).await? {
            let router = self.cloud.network.get_router(&node.id).await?;
            let config = reconstruct::router_config(&self.cloud, &router).await?;
            let mut creator = RouterCreator::new(self.cloud.clone(), config)?;
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    pub async fn get_volume_creators(&self) -> Result<Vec<VolumeCreator>> {
        let mut creators = Vec::new();
        for node in self.nodes(types::VOLUME).await? {
            let volume = self.cloud.volume.get_volume(&node.id).await?;
            let config = reconstruct::volume_config(&volume);
            let mut creator = VolumeCreator::new(self.cloud.clone(), config)?;
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    pub async fn get_volume_type_creators(&self) -> Result<Vec<VolumeTypeCreator>> {
        let mut creators = Vec::new();
        for node in self.nodes(types::VOLUME_TYPE).await? {
            let volume_type = self.cloud.volume.get_volume_type(&node.id).await?;
            let config = reconstruct::volume_type_config(&volume_type);
            let mut creator = VolumeTypeCreator::new(self.cloud.clone(), config)?;
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    pub async fn get_flavor_creators(&self) -> Result<Vec<FlavorCreator>> {
        let mut creators = Vec::new();
        for node in self.nodes(types::FLAVOR).await? {
            let flavor = self.cloud.compute.get_flavor(&node.id).await?;
            let config = reconstruct::flavor_config(&flavor);
            let mut creator = FlavorCreator::new(self.cloud.clone(), config)?;
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    /// Keypairs declared in the template. The physical ID of a keypair
    /// resource is its name. `private_key_output` names the stack output
    /// holding the generated private key, if the template exposes one.
    pub async fn get_keypair_creators(
        &self,
        private_key_output: Option<&str>,
    ) -> Result<Vec<KeypairCreator>> {
        let stack = self.held()?;
        let mut creators = Vec::new();
        for node in self.nodes(types::KEYPAIR).await? {
            let Some(keypair) = self.cloud.compute.find_keypair(&node.id).await? else {
                debug!("Keypair {} of stack {} not found", node.id, self.config.name);
                continue;
            };
            let config = reconstruct::keypair_config(
                &self.cloud,
                &keypair,
                &stack.id,
                private_key_output,
                &self.key_dir,
            )
            .await?;
            let mut creator = KeypairCreator::new(self.cloud.clone(), config)?;
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    pub async fn get_vm_inst_creators(
        &self,
        private_key_output: Option<&str>,
    ) -> Result<Vec<VmInstanceCreator>> {
        let stack = self.held()?;
        self.vm_inst_creators(&stack.id, private_key_output).await
    }

    async fn vm_inst_creators(
        &self,
        stack_id: &str,
        private_key_output: Option<&str>,
    ) -> Result<Vec<VmInstanceCreator>> {
        let nodes = graph::flatten(self.cloud.orchestration.as_ref(), stack_id, types::SERVER).await?;
        let mut creators = Vec::new();
        for node in nodes {
            let server = self.cloud.compute.get_server(&node.id).await?;
            let config = reconstruct::vm_config(&self.cloud, &server).await?;
            let image_config =
                reconstruct::image_config(&self.cloud, &server, &self.image_configs).await?;
            let keypair_config = reconstruct::server_keypair_config(
                &self.cloud,
                &server,
                &self.keypair_configs,
                stack_id,
                private_key_output,
                &self.key_dir,
            )
            .await?;

            let mut creator = VmInstanceCreator::adopted(
                self.cloud.clone(),
                config,
                image_config,
                keypair_config,
            );
            creator.initialize().await?;
            creators.push(creator);
        }
        Ok(creators)
    }

    /// Cleans every VM of the stack individually, logging failures.
    async fn clean_instances(&self, stack_id: &str) {
        let creators = match self.vm_inst_creators(stack_id, None).await {
            Ok(creators) => creators,
            Err(e) => {
                warn!("Could not list VM instances of stack {}: {}", self.config.name, e);
                return;
            }
        };
        for mut creator in creators {
            if let Err(e) = creator.clean().await {
                error!("Failed to clean VM instance {}: {}", creator.config().name, e);
            }
        }
    }
}

/// `<cache dir>/stackflow/keys`, or the system temp dir without one.
fn default_key_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("stackflow")
        .join("keys")
}

#[async_trait]
impl ResourceCreator for StackCreator {
    type Config = StackConfig;
    type Handle = Stack;

    fn config(&self) -> &StackConfig {
        &self.config
    }

    async fn initialize(&mut self) -> Result<Option<Stack>> {
        debug!("Looking up stack: {}", self.config.name);
        self.stack = self.cloud.orchestration.find_stack(&self.config.name).await?;
        Ok(self.stack.clone())
    }

    async fn create(&mut self) -> Result<Stack> {
        if let Some(stack) = self.initialize().await? {
            return Ok(stack);
        }

        let request = self.config.build_request()?;
        info!("Creating stack: {}", self.config.name);
        let stack = self.cloud.orchestration.create_stack(&request).await?;
        let id = stack.id.clone();
        self.stack = Some(stack);

        if !self.stack_complete(true).await? {
            let status = match self.cloud.orchestration.get_stack(&id).await {
                Ok(stack) => stack.status,
                Err(e) => e.to_string(),
            };
            return Err(creation_timeout(Stack::KIND, &self.config.name, status));
        }

        let stack = self.cloud.orchestration.get_stack(&id).await?;
        info!("Stack {} created", stack.name);
        self.stack = Some(stack.clone());
        Ok(stack)
    }

    async fn clean(&mut self) -> Result<()> {
        let Some(stack) = self.stack.take() else {
            return Ok(());
        };

        info!("Deleting stack: {}", stack.name);
        if self.delete_and_wait(&stack).await {
            return Ok(());
        }

        warn!(
            "Stack {} not deleted, cleaning its VM instances and retrying",
            stack.name
        );
        self.clean_instances(&stack.id).await;

        if self.delete_and_wait(&stack).await {
            info!("Stack {} deleted on retry", stack.name);
            return Ok(());
        }
        Err(CloudError::Cleanup(format!(
            "stack {} could not be deleted",
            stack.name
        )))
    }

    fn get(&self) -> Option<&Stack> {
        self.stack.as_ref()
    }
}
