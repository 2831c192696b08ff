//! ZooKeeper proxy network filter

use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::zookeeper_proxy::v3::ZooKeeperProxy;

use crate::xds::filters::typed_network_filter;

pub const ZOOKEEPER_PROXY_FILTER_NAME: &str = "envoy.filters.network.zookeeper_proxy";
pub const ZOOKEEPER_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.zookeeper_proxy.v3.ZooKeeperProxy";

/// Build a ZooKeeper proxy filter; Envoy prefixes its stats with `zookeeper.`.
pub fn build_zookeeper_filter(stat_prefix: &str) -> Filter {
    let zookeeper_proxy =
        ZooKeeperProxy { stat_prefix: stat_prefix.to_string(), ..Default::default() };
    typed_network_filter(ZOOKEEPER_PROXY_FILTER_NAME, ZOOKEEPER_PROXY_TYPE_URL, &zookeeper_proxy)
}
