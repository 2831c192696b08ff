//! Protocol classification and listener protocol resolution
//!
//! A port's declared application protocol decides two things: which listener
//! scaffolding wraps it (HTTP connection manager vs raw TCP) and which
//! protocol-aware network filters end up in the chain. This module owns the
//! first decision; the filter dispatch lives in [`crate::xds::filters::network`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SniffingPolicy;

/// Application protocol declared on a service port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    Tcp,
    Http,
    Http2,
    Grpc,
    GrpcWeb,
    Https,
    Tls,
    Mongo,
    Redis,
    MySql,
    Thrift,
    Kafka,
    ZooKeeper,
    /// Not declared, or not a protocol the mesh knows about
    Unsupported,
}

/// Transport category of a protocol, as seen by the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolCategory {
    Http,
    Tcp,
    Unsupported,
}

impl Protocol {
    /// All protocols with a name, in declaration order.
    pub const KNOWN: [Protocol; 13] = [
        Protocol::Tcp,
        Protocol::Http,
        Protocol::Http2,
        Protocol::Grpc,
        Protocol::GrpcWeb,
        Protocol::Https,
        Protocol::Tls,
        Protocol::Mongo,
        Protocol::Redis,
        Protocol::MySql,
        Protocol::Thrift,
        Protocol::Kafka,
        Protocol::ZooKeeper,
    ];

    /// Parse a protocol name case-insensitively. Unknown names are `Unsupported`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tcp" => Self::Tcp,
            "http" => Self::Http,
            "http2" => Self::Http2,
            "grpc" => Self::Grpc,
            "grpc-web" => Self::GrpcWeb,
            "https" => Self::Https,
            "tls" => Self::Tls,
            "mongo" => Self::Mongo,
            "redis" => Self::Redis,
            "mysql" => Self::MySql,
            "thrift" => Self::Thrift,
            "kafka" => Self::Kafka,
            "zookeeper" => Self::ZooKeeper,
            _ => Self::Unsupported,
        }
    }

    /// Infer the protocol from a port name such as `redis-primary` or `http`.
    pub fn from_port_name(name: &str) -> Self {
        // grpc-web is the one protocol whose own name contains a dash
        let lower = name.to_ascii_lowercase();
        if lower == "grpc-web" || lower.starts_with("grpc-web-") {
            return Self::GrpcWeb;
        }
        let prefix = lower.split('-').next().unwrap_or_default();
        Self::parse(prefix)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Http => "HTTP",
            Self::Http2 => "HTTP2",
            Self::Grpc => "GRPC",
            Self::GrpcWeb => "GRPC-Web",
            Self::Https => "HTTPS",
            Self::Tls => "TLS",
            Self::Mongo => "Mongo",
            Self::Redis => "Redis",
            Self::MySql => "MySQL",
            Self::Thrift => "Thrift",
            Self::Kafka => "Kafka",
            Self::ZooKeeper => "ZooKeeper",
            Self::Unsupported => "UnsupportedProtocol",
        }
    }

    /// Listener transport category for this protocol.
    pub fn category(&self) -> ProtocolCategory {
        match self {
            Self::Http | Self::Http2 | Self::Grpc | Self::GrpcWeb => ProtocolCategory::Http,
            Self::Tcp
            | Self::Https
            | Self::Tls
            | Self::Mongo
            | Self::Redis
            | Self::MySql
            | Self::Thrift
            | Self::Kafka
            | Self::ZooKeeper => ProtocolCategory::Tcp,
            Self::Unsupported => ProtocolCategory::Unsupported,
        }
    }

    pub fn is_http(&self) -> bool {
        self.category() == ProtocolCategory::Http
    }

    pub fn is_tcp(&self) -> bool {
        self.category() == ProtocolCategory::Tcp
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Unsupported
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Protocol {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Protocol {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Protocol> for String {
    fn from(value: Protocol) -> Self {
        value.as_str().to_string()
    }
}

/// Direction of traffic relative to the proxied workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficDirection {
    Inbound,
    Outbound,
}

impl TrafficDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl fmt::Display for TrafficDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport mode of a rendered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListenerProtocol {
    Tcp,
    Http,
    /// Protocol detected by the data plane when the connection arrives
    Auto,
}

impl fmt::Display for ListenerProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Tcp => "TCP",
            Self::Http => "HTTP",
            Self::Auto => "AUTO",
        };
        f.write_str(value)
    }
}

/// Map a declared port protocol to the listener protocol for `direction`.
///
/// HTTP-family protocols get HTTP listeners; TCP and every recognised
/// application protocol get TCP listeners (protocol awareness is added at the
/// filter level). Anything else is sniffed when sniffing is enabled for that
/// direction, and falls back to TCP otherwise.
pub fn resolve_listener_protocol(
    protocol: Protocol,
    direction: TrafficDirection,
    sniffing: &SniffingPolicy,
) -> ListenerProtocol {
    match protocol.category() {
        ProtocolCategory::Http => ListenerProtocol::Http,
        ProtocolCategory::Tcp => ListenerProtocol::Tcp,
        ProtocolCategory::Unsupported => {
            if sniffing.enabled_for(direction) {
                ListenerProtocol::Auto
            } else {
                ListenerProtocol::Tcp
            }
        }
    }
}
