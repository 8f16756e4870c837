//! Descriptor reconstruction from live resources
//!
//! Used when adopting resources a stack created: the platform's view of a
//! resource is mapped back onto the descriptor that would have produced it.
//! References that cannot be resolved are left as `None` rather than failing.

use crate::keypair::write_private_key;
use stackflow_cloud::{
    Cloud, Flavor, Keypair, Network, PortFilter, Result, Router, Server, Subnet, Volume,
    VolumeType, optional,
};
use stackflow_core::{
    FixedIpConfig, FlavorConfig, FloatingIpConfig, ImageConfig, KeypairConfig, NetworkConfig,
    PortConfig, RouterConfig, SubnetConfig, VmInstanceConfig, VolumeConfig,
    VolumeTypeConfig, VolumeTypeEncryptionConfig,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const ROUTER_INTERFACE_OWNER: &str = "network:router_interface";

pub fn subnet_config(subnet: &Subnet) -> SubnetConfig {
    let pool = subnet.allocation_pools.first();
    SubnetConfig {
        name: subnet.name.clone(),
        cidr: subnet.cidr.clone(),
        ip_version: subnet.ip_version,
        project_name: None,
        start: pool.map(|p| p.start.clone()),
        end: pool.map(|p| p.end.clone()),
        gateway_ip: subnet.gateway_ip.clone(),
        enable_dhcp: Some(subnet.enable_dhcp),
        dns_nameservers: subnet.dns_nameservers.clone(),
        host_routes: subnet.host_routes.clone(),
        ipv6_ra_mode: subnet.ipv6_ra_mode.clone(),
        ipv6_address_mode: subnet.ipv6_address_mode.clone(),
    }
}

pub fn network_config(network: &Network, subnets: &[Subnet]) -> NetworkConfig {
    NetworkConfig {
        name: network.name.clone(),
        admin_state_up: network.admin_state_up,
        shared: Some(network.shared),
        project_name: None,
        external: network.external,
        network_type: network.network_type.clone(),
        physical_network: network.physical_network.clone(),
        segmentation_id: network.segmentation_id,
        mtu: network.mtu,
        subnets: subnets.iter().map(subnet_config).collect(),
    }
}

pub async fn router_config(cloud: &Cloud, router: &Router) -> Result<RouterConfig> {
    let external_gateway = match &router.external_network_id {
        Some(id) => optional(cloud.network.get_network(id).await)?.map(|n| n.name),
        None => None,
    };

    let mut internal_subnets = Vec::new();
    for port in cloud
        .network
        .list_ports(&PortFilter::device(&router.id))
        .await?
    {
        if port.device_owner.as_deref() != Some(ROUTER_INTERFACE_OWNER) {
            continue;
        }
        for fixed_ip in &port.fixed_ips {
            if let Some(subnet) = optional(cloud.network.get_subnet(&fixed_ip.subnet_id).await)? {
                if !internal_subnets.contains(&subnet.name) {
                    internal_subnets.push(subnet.name);
                }
            }
        }
    }

    Ok(RouterConfig {
        name: router.name.clone(),
        project_name: None,
        external_gateway,
        admin_state_up: router.admin_state_up,
        enable_snat: router.enable_snat,
        internal_subnets,
    })
}

pub fn flavor_config(flavor: &Flavor) -> FlavorConfig {
    FlavorConfig {
        name: flavor.name.clone(),
        flavor_id: flavor.id.clone(),
        ram: flavor.ram,
        disk: flavor.disk,
        vcpus: flavor.vcpus,
        ephemeral: flavor.ephemeral,
        swap: flavor.swap,
        rxtx_factor: flavor.rxtx_factor,
        is_public: flavor.is_public,
        metadata: HashMap::new(),
    }
}

pub fn volume_config(volume: &Volume) -> VolumeConfig {
    VolumeConfig {
        name: volume.name.clone(),
        project_name: None,
        description: volume.description.clone(),
        size: volume.size,
        image_name: None,
        type_name: volume.volume_type.clone(),
        availability_zone: volume.availability_zone.clone(),
        multi_attach: volume.multi_attach,
    }
}

pub fn volume_type_config(volume_type: &VolumeType) -> VolumeTypeConfig {
    VolumeTypeConfig {
        name: volume_type.name.clone(),
        description: volume_type.description.clone(),
        encryption: volume_type
            .encryption
            .as_ref()
            .map(|e| VolumeTypeEncryptionConfig {
                name: volume_type.name.clone(),
                provider_class: e.provider.clone(),
                control_location: e.control_location,
                cipher: e.cipher.clone(),
                key_size: e.key_size,
            }),
        qos_spec_name: volume_type.qos_spec.as_ref().map(|q| q.name.clone()),
        public: volume_type.public,
    }
}

/// Keypair descriptor for a keypair created by a stack.
///
/// The platform never returns a stored private key, so it can only come from
/// the stack output named `private_key_output`. When that output exists its
/// value is written to `<key_dir>/<name>.pem`; otherwise the descriptor has
/// no private key path.
pub async fn keypair_config(
    cloud: &Cloud,
    keypair: &Keypair,
    stack_id: &str,
    private_key_output: Option<&str>,
    key_dir: &Path,
) -> Result<KeypairConfig> {
    let mut config = KeypairConfig::new(&keypair.name);

    let Some(output_key) = private_key_output else {
        debug!("No private key output requested for keypair {}", keypair.name);
        return Ok(config);
    };

    let outputs = cloud.orchestration.list_outputs(stack_id).await?;
    match outputs.iter().find(|o| o.key == output_key) {
        Some(output) => {
            let path = key_dir.join(format!("{}.pem", keypair.name));
            write_private_key(&path, &output.value_string()).await?;
            config.private_filepath = Some(path);
        }
        None => warn!(
            "Stack output {} not found; keypair {} adopted without a private key",
            output_key, keypair.name
        ),
    }
    Ok(config)
}

/// Image descriptor for the image a server was booted from.
///
/// Matches the image name against `known`; an unmatched image is described
/// as one that must already exist.
pub async fn image_config(
    cloud: &Cloud,
    server: &Server,
    known: &[ImageConfig],
) -> Result<Option<ImageConfig>> {
    let Some(image_id) = &server.image_id else {
        return Ok(None);
    };
    let Some(image) = optional(cloud.image.get_image(image_id).await)? else {
        warn!("Image {} of server {} no longer exists", image_id, server.name);
        return Ok(None);
    };
    Ok(Some(
        known
            .iter()
            .find(|c| c.name == image.name)
            .cloned()
            .unwrap_or_else(|| ImageConfig::existing(image.name)),
    ))
}

/// Keypair descriptor for the keypair a server was booted with, preferring
/// a caller-supplied descriptor over the stack output fallback.
pub async fn server_keypair_config(
    cloud: &Cloud,
    server: &Server,
    known: &[KeypairConfig],
    stack_id: &str,
    private_key_output: Option<&str>,
    key_dir: &Path,
) -> Result<Option<KeypairConfig>> {
    let Some(name) = &server.keypair_name else {
        return Ok(None);
    };
    if let Some(config) = known.iter().find(|c| &c.name == name) {
        return Ok(Some(config.clone()));
    }
    let Some(keypair) = cloud.compute.find_keypair(name).await? else {
        warn!("Keypair {} of server {} no longer exists", name, server.name);
        return Ok(None);
    };
    keypair_config(cloud, &keypair, stack_id, private_key_output, key_dir)
        .await
        .map(Some)
}

/// VM descriptor rebuilt from the server's ports and floating IPs.
///
/// DHCP ports are skipped. Each fixed IP is named by the subnet it belongs
/// to; floating IPs are named `fip-1`, `fip-2`, ... in platform order.
/// A network, subnet or router that no longer resolves is left as `None`
/// and the entry is kept.
pub async fn vm_config(cloud: &Cloud, server: &Server) -> Result<VmInstanceConfig> {
    let ports: Vec<_> = cloud
        .network
        .list_ports(&PortFilter::device(&server.id))
        .await?
        .into_iter()
        .filter(|p| !p.is_dhcp())
        .collect();

    let mut subnet_names: HashMap<String, String> = HashMap::new();
    let mut port_settings = Vec::with_capacity(ports.len());
    for port in &ports {
        let network_name = optional(cloud.network.get_network(&port.network_id).await)?
            .map(|network| network.name);
        if network_name.is_none() {
            warn!("Network {} of port {} not found", port.network_id, port.name);
        }

        let mut ip_addrs = Vec::with_capacity(port.fixed_ips.len());
        for fixed_ip in &port.fixed_ips {
            let subnet_name = match subnet_names.get(&fixed_ip.subnet_id) {
                Some(name) => Some(name.clone()),
                None => optional(cloud.network.get_subnet(&fixed_ip.subnet_id).await)?.map(
                    |subnet| {
                        subnet_names.insert(fixed_ip.subnet_id.clone(), subnet.name.clone());
                        subnet.name
                    },
                ),
            };
            if subnet_name.is_none() {
                warn!(
                    "Subnet {} of IP {} on port {} not found",
                    fixed_ip.subnet_id, fixed_ip.ip_address, port.name
                );
            }
            ip_addrs.push(FixedIpConfig {
                subnet_name,
                ip: fixed_ip.ip_address.clone(),
            });
        }

        port_settings.push(PortConfig {
            name: port.name.clone(),
            network_name,
            project_name: None,
            mac_address: Some(port.mac_address.clone()),
            ip_addrs,
            security_groups: Vec::new(),
            allowed_address_pairs: port.allowed_address_pairs.clone(),
            admin_state: port.admin_state_up,
        });
    }

    let port_ids: Vec<String> = ports.iter().map(|p| p.id.clone()).collect();
    let mut floating_ip_settings = Vec::new();
    for floating_ip in cloud.network.list_floating_ips(&port_ids).await? {
        let Some(port) = ports
            .iter()
            .find(|p| floating_ip.port_id.as_deref() == Some(p.id.as_str()))
        else {
            continue;
        };
        let router_name = match &floating_ip.router_id {
            Some(id) => optional(cloud.network.get_router(id).await)?.map(|r| r.name),
            None => None,
        };
        if router_name.is_none() {
            warn!(
                "Router of floating IP {} not found",
                floating_ip.floating_ip_address
            );
        }
        let subnet_name = port
            .fixed_ips
            .iter()
            .find(|ip| floating_ip.fixed_ip_address.as_deref() == Some(ip.ip_address.as_str()))
            .and_then(|ip| subnet_names.get(&ip.subnet_id).cloned());

        floating_ip_settings.push(FloatingIpConfig {
            name: format!("fip-{}", floating_ip_settings.len() + 1),
            port_name: Some(port.name.clone()),
            port_id: Some(port.id.clone()),
            router_name,
            subnet_name,
            provisioning: true,
        });
    }

    Ok(VmInstanceConfig {
        name: server.name.clone(),
        flavor: server.flavor.clone(),
        port_settings,
        security_group_names: server.security_group_names.clone(),
        floating_ip_settings,
        availability_zone: server.availability_zone.clone(),
        ..Default::default()
    })
}
