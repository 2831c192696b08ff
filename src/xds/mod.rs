//! Envoy listener configuration for TCP-level traffic
//!
//! Decides how a listener port is proxied and renders its network filters:
//! - `protocol`: declared protocols and the listener protocol resolver
//! - `naming`: cluster names and stat prefixes
//! - `access_log`: file and gRPC access log sinks for the TCP proxy
//! - `filters`: typed-config helpers and the protocol filter factory
//! - `network_filters`: the filter chain builder
//!
//! Rendering reads a [`PushContext`] snapshot and never mutates it.

pub mod access_log;
pub mod context;
pub mod filters;
pub mod model;
pub mod naming;
pub mod network_filters;
pub mod protocol;

pub use access_log::{attach_access_logs, build_file_access_log, TcpGrpcAccessLog};
pub use context::PushContext;
pub use filters::FilterView;
pub use model::{
    ConfigMeta, Destination, NodeMetadata, Port, Proxy, RouteDestination, Service,
    ServiceAttributes, ServiceInstance, ServiceRegistry,
};
pub use network_filters::NetworkFilterBuilder;
pub use protocol::{resolve_listener_protocol, ListenerProtocol, Protocol, TrafficDirection};
