//! Cluster names and stat prefixes
//!
//! Cluster names are keyed by direction, port, subset and hostname. Stat
//! prefixes default to the cluster name, but the mesh can configure a pattern
//! per direction so metric names stay stable across pushes regardless of how
//! clusters are keyed.

use crate::config::MeshConfig;
use crate::xds::model::{Destination, Port, Service, ServiceAttributes, ServiceRegistry};
use crate::xds::protocol::TrafficDirection;

/// Cluster that drops every connection
pub const BLACK_HOLE_CLUSTER: &str = "BlackHoleCluster";

const SERVICE_TOKEN: &str = "%SERVICE%";
const SERVICE_FQDN_TOKEN: &str = "%SERVICE_FQDN%";
const SUBSET_NAME_TOKEN: &str = "%SUBSET_NAME%";
const SERVICE_PORT_TOKEN: &str = "%SERVICE_PORT%";
const SERVICE_PORT_NAME_TOKEN: &str = "%SERVICE_PORT_NAME%";

/// Build a `direction|port|subset|hostname` cluster key
pub fn subset_cluster_name(
    direction: TrafficDirection,
    subset: &str,
    hostname: &str,
    port: u32,
) -> String {
    format!("{}|{}|{}|{}", direction, port, subset, hostname)
}

/// Inbound cluster for a service port; the subset slot carries the port name
pub fn inbound_cluster_name(service: &Service, port: &Port) -> String {
    subset_cluster_name(TrafficDirection::Inbound, &port.name, &service.hostname, port.port)
}

/// Outbound cluster for a route destination on `listener_port`
///
/// An explicit destination port wins. Without one, a resolved service that
/// exposes exactly one port decides the port; otherwise the listener port is
/// used.
pub fn destination_cluster_name(
    destination: &Destination,
    service: Option<&Service>,
    listener_port: u32,
) -> String {
    let port = match (destination.port, service) {
        (Some(port), _) => port,
        (None, Some(service)) if service.ports.len() == 1 => service.ports[0].port,
        _ => listener_port,
    };
    subset_cluster_name(TrafficDirection::Outbound, &destination.subset, &destination.host, port)
}

fn short_host_name(host: &str, attributes: &ServiceAttributes) -> String {
    match attributes.registry {
        ServiceRegistry::Kubernetes if !attributes.name.is_empty() => {
            format!("{}.{}", attributes.name, attributes.namespace)
        }
        _ => host.to_string(),
    }
}

/// Expand a stat name pattern for a service port
pub fn build_stat_prefix(
    pattern: &str,
    host: &str,
    subset: &str,
    port: &Port,
    attributes: &ServiceAttributes,
) -> String {
    // %SERVICE% must go first; it is not a substring of %SERVICE_FQDN%
    pattern
        .replace(SERVICE_TOKEN, &short_host_name(host, attributes))
        .replace(SERVICE_FQDN_TOKEN, host)
        .replace(SUBSET_NAME_TOKEN, subset)
        .replace(SERVICE_PORT_TOKEN, &port.port.to_string())
        .replace(SERVICE_PORT_NAME_TOKEN, &port.name)
}

/// Inbound stat prefix: the mesh pattern when configured, else the cluster name
pub fn inbound_stat_prefix(
    mesh: &MeshConfig,
    cluster_name: &str,
    service: &Service,
    port: &Port,
) -> String {
    match mesh.cluster_stat_name(TrafficDirection::Inbound) {
        Some(pattern) => build_stat_prefix(pattern, &service.hostname, "", port, &service.attributes),
        None => cluster_name.to_string(),
    }
}

/// Outbound stat prefix for a single destination
///
/// The pattern needs service attributes, so it only applies when the
/// destination host resolved to a known service.
pub fn outbound_stat_prefix(
    mesh: &MeshConfig,
    cluster_name: &str,
    destination: &Destination,
    service: Option<&Service>,
    port: &Port,
) -> String {
    match (mesh.cluster_stat_name(TrafficDirection::Outbound), service) {
        (Some(pattern), Some(service)) => build_stat_prefix(
            pattern,
            &destination.host,
            &destination.subset,
            port,
            &service.attributes,
        ),
        _ => cluster_name.to_string(),
    }
}

/// Stat prefix shared by every split of a weighted route: `name.namespace`
pub fn weighted_stat_prefix(name: &str, namespace: &str) -> String {
    format!("{}.{}", name, namespace)
}
