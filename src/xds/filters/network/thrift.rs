//! Thrift proxy network filter

use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::thrift_proxy::v3::ThriftProxy;

use crate::xds::filters::typed_network_filter;

pub const THRIFT_PROXY_FILTER_NAME: &str = "envoy.filters.network.thrift_proxy";
pub const THRIFT_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.thrift_proxy.v3.ThriftProxy";

/// Build a Thrift proxy filter; Envoy prefixes its stats with `thrift.`.
pub fn build_thrift_filter(stat_prefix: &str) -> Filter {
    let thrift_proxy = ThriftProxy { stat_prefix: stat_prefix.to_string(), ..Default::default() };
    typed_network_filter(THRIFT_PROXY_FILTER_NAME, THRIFT_PROXY_TYPE_URL, &thrift_proxy)
}
