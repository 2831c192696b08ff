//! Read-only snapshot types consumed while rendering listeners
//!
//! These mirror what service discovery and the routing config store hand to
//! the listener pipeline. The filter-chain core never mutates them.

use serde::{Deserialize, Serialize};

use crate::xds::protocol::Protocol;

/// A named service port with its declared protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub port: u32,
    /// Declared protocol; when omitted it is inferred from the port name
    #[serde(default)]
    pub protocol: Option<Protocol>,
}

impl Port {
    pub fn new(name: impl Into<String>, port: u32, protocol: Protocol) -> Self {
        Self { name: name.into(), port, protocol: Some(protocol) }
    }

    /// Declared protocol, falling back to the port-name convention
    pub fn protocol(&self) -> Protocol {
        self.protocol.unwrap_or_else(|| Protocol::from_port_name(&self.name))
    }
}

/// Registry a service was discovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRegistry {
    #[default]
    Kubernetes,
    External,
}

/// Identity attributes of a service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceAttributes {
    pub registry: ServiceRegistry,
    pub name: String,
    pub namespace: String,
}

/// A service known to the mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub hostname: String,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub attributes: ServiceAttributes,
}

/// A workload instance of a service, listening on one service port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub service: Service,
    pub service_port: Port,
}

/// Target of a route: host, optional subset and optional port override
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub host: String,
    pub subset: String,
    pub port: Option<u32>,
}

/// A destination with its traffic weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDestination {
    pub destination: Destination,
    #[serde(default)]
    pub weight: i32,
}

impl RouteDestination {
    pub fn new(host: impl Into<String>, weight: i32) -> Self {
        Self { destination: Destination { host: host.into(), ..Default::default() }, weight }
    }

    pub fn with_subset(mut self, subset: impl Into<String>) -> Self {
        self.destination.subset = subset.into();
        self
    }
}

/// Name and namespace of the routing resource that owns a set of routes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigMeta {
    pub name: String,
    pub namespace: String,
}

impl ConfigMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: namespace.into() }
    }
}

/// Metadata a proxy advertises about itself
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NodeMetadata {
    /// TCP idle timeout override as a duration string
    pub idle_timeout: Option<String>,
}

/// The proxy a listener is rendered for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proxy {
    /// Node identity, used for diagnostics only
    pub id: String,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Proxy {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), metadata: NodeMetadata::default() }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: impl Into<String>) -> Self {
        self.metadata.idle_timeout = Some(idle_timeout.into());
        self
    }
}
