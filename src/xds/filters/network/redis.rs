//! Redis proxy network filter
//!
//! The Redis proxy carries its own routing (a catch-all prefix route), so it
//! terminates the chain. Only one cluster can be addressed.

use std::time::Duration;

use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::redis_proxy::v3::{
    redis_proxy::{prefix_routes::Route, ConnPoolSettings, PrefixRoutes},
    RedisProxy,
};

use crate::xds::filters::network::tcp_proxy::proto_duration;
use crate::xds::filters::typed_network_filter;

pub const REDIS_PROXY_FILTER_NAME: &str = "envoy.filters.network.redis_proxy";
pub const REDIS_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.redis_proxy.v3.RedisProxy";

/// Upstream operation timeout for proxied Redis commands
pub const REDIS_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a Redis proxy sending every command to `cluster`
///
/// Envoy prefixes the emitted stats with `redis.`.
pub fn build_redis_filter(stat_prefix: &str, cluster: &str) -> Filter {
    let redis_proxy = RedisProxy {
        stat_prefix: stat_prefix.to_string(),
        latency_in_micros: true,
        settings: Some(ConnPoolSettings {
            op_timeout: Some(proto_duration(REDIS_OP_TIMEOUT)),
            ..Default::default()
        }),
        prefix_routes: Some(PrefixRoutes {
            catch_all_route: Some(Route { cluster: cluster.to_string(), ..Default::default() }),
            ..Default::default()
        }),
        ..Default::default()
    };

    typed_network_filter(REDIS_PROXY_FILTER_NAME, REDIS_PROXY_TYPE_URL, &redis_proxy)
}
