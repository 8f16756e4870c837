//! Resource graph traversal for deployed stacks

use stackflow_cloud::{OrchestrationApi, ResourceNode, Result};
use tracing::debug;

/// Template type tags understood by the stack manager
pub mod types {
    /// Nested group marker; its physical ID is a nested stack ID
    pub const RESOURCE_GROUP: &str = "OS::Heat::ResourceGroup";
    pub const SERVER: &str = "OS::Nova::Server";
    pub const NETWORK: &str = "OS::Neutron::Net";
    pub const ROUTER: &str = "OS::Neutron::Router";
    pub const KEYPAIR: &str = "OS::Nova::KeyPair";
    pub const VOLUME: &str = "OS::Cinder::Volume";
    pub const VOLUME_TYPE: &str = "OS::Cinder::VolumeType";
    pub const FLAVOR: &str = "OS::Nova::Flavor";
}

/// Leaf resources of `stack_id` whose type is `resource_type`.
///
/// Groups are expanded depth first in place, so the result keeps the order
/// in which the platform lists children. Group nodes themselves are never
/// returned. The graph is queried fresh on every call.
pub async fn flatten(
    orchestration: &dyn OrchestrationApi,
    stack_id: &str,
    resource_type: &str,
) -> Result<Vec<ResourceNode>> {
    walk(orchestration, stack_id, Some(resource_type)).await
}

/// Every leaf resource of `stack_id`, groups expanded.
pub async fn all_resources(
    orchestration: &dyn OrchestrationApi,
    stack_id: &str,
) -> Result<Vec<ResourceNode>> {
    walk(orchestration, stack_id, None).await
}

async fn walk(
    orchestration: &dyn OrchestrationApi,
    stack_id: &str,
    resource_type: Option<&str>,
) -> Result<Vec<ResourceNode>> {
    let mut found = Vec::new();
    let mut pending = vec![orchestration.list_resources(stack_id).await?.into_iter()];

    while let Some(level) = pending.last_mut() {
        let Some(node) = level.next() else {
            pending.pop();
            continue;
        };
        if node.resource_type == types::RESOURCE_GROUP {
            debug!(group = %node.name, depth = pending.len(), "Expanding resource group");
            let children = orchestration.list_resources(&node.id).await?;
            pending.push(children.into_iter());
        } else if resource_type.is_none_or(|t| t == node.resource_type) {
            found.push(node);
        }
    }
    Ok(found)
}
