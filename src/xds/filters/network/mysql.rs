//! MySQL proxy network filter
//!
//! The MySQL proxy lives in Envoy's contrib API, which `envoy-types` does not
//! ship, so its config message is declared here. It only decodes the protocol
//! for stats; a TCP proxy must follow it.

use envoy_types::pb::envoy::config::listener::v3::Filter;

use crate::xds::filters::typed_network_filter;

pub const MYSQL_PROXY_FILTER_NAME: &str = "envoy.filters.network.mysql_proxy";
pub const MYSQL_PROXY_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.mysql_proxy.v3.MySQLProxy";

/// `envoy.extensions.filters.network.mysql_proxy.v3.MySQLProxy`
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MySqlProxy {
    #[prost(string, tag = "1")]
    pub stat_prefix: String,
    /// Optional file path for the per-query access log
    #[prost(string, tag = "2")]
    pub access_log: String,
}

/// Build a MySQL proxy filter; Envoy prefixes its stats with `mysql.`.
pub fn build_mysql_filter(stat_prefix: &str) -> Filter {
    let mysql_proxy = MySqlProxy { stat_prefix: stat_prefix.to_string(), ..Default::default() };
    typed_network_filter(MYSQL_PROXY_FILTER_NAME, MYSQL_PROXY_TYPE_URL, &mysql_proxy)
}
