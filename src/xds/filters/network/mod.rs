//! Protocol-aware network filters and the table that stacks them.
//!
//! A TCP-level listener always ends in exactly one filter that picks the
//! upstream. Protocol proxies fall in two groups:
//!
//! - **Observational** proxies (Mongo, MySQL) only decode traffic for stats,
//!   so the TCP proxy must follow them.
//! - **Terminating** proxies (Redis, Thrift, Kafka, ZooKeeper) carry their own
//!   upstream selection and must not be followed by a TCP proxy.
//!
//! [`PROTOCOL_FILTERS`] records which group each protocol belongs to and which
//! feature flag gates it. Adding a protocol means adding a row.

pub mod kafka;
pub mod mongo;
pub mod mysql;
pub mod redis;
pub mod tcp_proxy;
pub mod thrift;
pub mod zookeeper;

use envoy_types::pb::envoy::config::listener::v3::Filter;

use crate::config::{ProtocolFilterFlag, ProtocolFilterPolicy};
use crate::xds::protocol::Protocol;

pub use kafka::{build_kafka_filter, KAFKA_BROKER_FILTER_NAME};
pub use mongo::{build_mongo_filter, MONGO_PROXY_FILTER_NAME};
pub use mysql::{build_mysql_filter, MYSQL_PROXY_FILTER_NAME};
pub use redis::{build_redis_filter, REDIS_PROXY_FILTER_NAME};
pub use tcp_proxy::{tcp_proxy_filter, TCP_PROXY_FILTER_NAME};
pub use thrift::{build_thrift_filter, THRIFT_PROXY_FILTER_NAME};
pub use zookeeper::{build_zookeeper_filter, ZOOKEEPER_PROXY_FILTER_NAME};

/// Filter that picks the upstream cluster from the TLS SNI at connection time
pub const SNI_CLUSTER_FILTER_NAME: &str = "envoy.filters.network.sni_cluster";

/// SNI cluster filter; it takes no configuration
pub fn sni_cluster_filter() -> Filter {
    Filter { name: SNI_CLUSTER_FILTER_NAME.to_string(), config_type: None }
}

/// Whether a protocol filter selects the upstream itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRole {
    /// Inspects traffic; a TCP proxy follows it
    Observational,
    /// Routes traffic itself; nothing follows it
    Terminating,
}

/// Inputs a protocol filter may draw on
#[derive(Debug, Clone, Copy)]
pub struct ProtocolFilterInput<'a> {
    pub stat_prefix: &'a str,
    /// Representative upstream cluster, for proxies that embed one route
    pub cluster_name: &'a str,
}

/// One row of the protocol dispatch table
#[derive(Debug, Clone, Copy)]
pub struct ProtocolFilterEntry {
    pub protocol: Protocol,
    pub role: FilterRole,
    /// Feature flag that must be on; `None` means always injected
    pub gate: Option<ProtocolFilterFlag>,
    pub build: fn(&ProtocolFilterInput<'_>) -> Filter,
}

impl ProtocolFilterEntry {
    fn is_enabled(&self, policy: &ProtocolFilterPolicy) -> bool {
        self.gate.map_or(true, |flag| policy.is_enabled(flag))
    }
}

fn mongo(input: &ProtocolFilterInput<'_>) -> Filter {
    build_mongo_filter(input.stat_prefix)
}

fn redis(input: &ProtocolFilterInput<'_>) -> Filter {
    build_redis_filter(input.stat_prefix, input.cluster_name)
}

fn mysql(input: &ProtocolFilterInput<'_>) -> Filter {
    build_mysql_filter(input.stat_prefix)
}

fn thrift(input: &ProtocolFilterInput<'_>) -> Filter {
    build_thrift_filter(input.stat_prefix)
}

fn kafka(input: &ProtocolFilterInput<'_>) -> Filter {
    build_kafka_filter(input.stat_prefix)
}

fn zookeeper(input: &ProtocolFilterInput<'_>) -> Filter {
    build_zookeeper_filter(input.stat_prefix)
}

/// Protocol dispatch table. Protocols without a row get the TCP proxy alone.
pub static PROTOCOL_FILTERS: &[ProtocolFilterEntry] = &[
    ProtocolFilterEntry {
        protocol: Protocol::Mongo,
        role: FilterRole::Observational,
        gate: None,
        build: mongo,
    },
    ProtocolFilterEntry {
        protocol: Protocol::Redis,
        role: FilterRole::Terminating,
        gate: Some(ProtocolFilterFlag::Redis),
        build: redis,
    },
    ProtocolFilterEntry {
        protocol: Protocol::MySql,
        role: FilterRole::Observational,
        gate: Some(ProtocolFilterFlag::MySql),
        build: mysql,
    },
    ProtocolFilterEntry {
        protocol: Protocol::Thrift,
        role: FilterRole::Terminating,
        gate: Some(ProtocolFilterFlag::Thrift),
        build: thrift,
    },
    ProtocolFilterEntry {
        protocol: Protocol::Kafka,
        role: FilterRole::Terminating,
        gate: Some(ProtocolFilterFlag::Kafka),
        build: kafka,
    },
    ProtocolFilterEntry {
        protocol: Protocol::ZooKeeper,
        role: FilterRole::Terminating,
        gate: Some(ProtocolFilterFlag::ZooKeeper),
        build: zookeeper,
    },
];

/// The table row that applies to `protocol` under `policy`, if any
pub fn protocol_filter_entry(
    protocol: Protocol,
    policy: &ProtocolFilterPolicy,
) -> Option<&'static ProtocolFilterEntry> {
    PROTOCOL_FILTERS.iter().find(|entry| entry.protocol == protocol && entry.is_enabled(policy))
}

/// Stack the protocol filter for `protocol` around a prebuilt TCP proxy filter
pub fn build_network_filter_stack(
    protocol: Protocol,
    policy: &ProtocolFilterPolicy,
    tcp_filter: Filter,
    input: &ProtocolFilterInput<'_>,
) -> Vec<Filter> {
    match protocol_filter_entry(protocol, policy) {
        Some(entry) => match entry.role {
            FilterRole::Observational => vec![(entry.build)(input), tcp_filter],
            FilterRole::Terminating => vec![(entry.build)(input)],
        },
        None => vec![tcp_filter],
    }
}
