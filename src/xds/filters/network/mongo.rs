//! Mongo proxy network filter
//!
//! Observational: it decodes the wire protocol for stats and leaves upstream
//! selection to the TCP proxy that follows it.

use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::mongo_proxy::v3::MongoProxy;

use crate::xds::filters::typed_network_filter;

pub const MONGO_PROXY_FILTER_NAME: &str = "envoy.filters.network.mongo_proxy";
pub const MONGO_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.mongo_proxy.v3.MongoProxy";

/// Build a Mongo proxy filter; Envoy prefixes its stats with `mongo.`.
pub fn build_mongo_filter(stat_prefix: &str) -> Filter {
    let mongo_proxy = MongoProxy { stat_prefix: stat_prefix.to_string(), ..Default::default() };
    typed_network_filter(MONGO_PROXY_FILTER_NAME, MONGO_PROXY_TYPE_URL, &mongo_proxy)
}
