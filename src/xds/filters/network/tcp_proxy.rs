//! TCP proxy network filter
//!
//! The TCP proxy is the filter that picks the upstream for raw TCP listeners,
//! either a single cluster or a weighted set of clusters.

use std::time::Duration;

use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::{
    tcp_proxy::{weighted_cluster::ClusterWeight, ClusterSpecifier, WeightedCluster},
    TcpProxy,
};
use envoy_types::pb::google::protobuf::Duration as ProtoDuration;

use crate::xds::filters::typed_network_filter;

pub const TCP_PROXY_FILTER_NAME: &str = "envoy.filters.network.tcp_proxy";
pub const TCP_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy";

/// TCP proxy routing every connection to `cluster`
pub fn tcp_proxy_to_cluster(stat_prefix: &str, cluster: &str) -> TcpProxy {
    TcpProxy {
        stat_prefix: stat_prefix.to_string(),
        cluster_specifier: Some(ClusterSpecifier::Cluster(cluster.to_string())),
        ..Default::default()
    }
}

/// TCP proxy splitting connections across `clusters` by weight
pub fn tcp_proxy_to_weighted_clusters<I>(stat_prefix: &str, clusters: I) -> TcpProxy
where
    I: IntoIterator<Item = (String, u32)>,
{
    let clusters = clusters
        .into_iter()
        .map(|(name, weight)| ClusterWeight { name, weight, ..Default::default() })
        .collect();

    TcpProxy {
        stat_prefix: stat_prefix.to_string(),
        cluster_specifier: Some(ClusterSpecifier::WeightedClusters(WeightedCluster { clusters })),
        ..Default::default()
    }
}

pub fn set_idle_timeout(tcp_proxy: &mut TcpProxy, timeout: Duration) {
    tcp_proxy.idle_timeout = Some(proto_duration(timeout));
}

/// Wrap a TCP proxy config into its network filter
pub fn tcp_proxy_filter(tcp_proxy: &TcpProxy) -> Filter {
    typed_network_filter(TCP_PROXY_FILTER_NAME, TCP_PROXY_TYPE_URL, tcp_proxy)
}

/// Convert to the protobuf form, saturating at the largest representable second
pub(crate) fn proto_duration(duration: Duration) -> ProtoDuration {
    ProtoDuration {
        seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
        nanos: duration.subsec_nanos() as i32,
    }
}
