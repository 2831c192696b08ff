use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::{
    tcp_proxy::ClusterSpecifier, TcpProxy,
};
use meshplane::config::{FeatureFlags, MeshConfig, ProtocolFilterPolicy};
use meshplane::xds::filters::decode_typed_config;
use meshplane::xds::filters::network::TCP_PROXY_FILTER_NAME;
use meshplane::xds::{Port, Protocol, PushContext, Service, ServiceAttributes};

pub const PRODUCTPAGE_NODE: &str = "sidecar~10.1.0.4~productpage-v1.bookinfo~bookinfo.svc.cluster.local";

pub fn ratings_service() -> Service {
    Service {
        hostname: "ratings.bookinfo.svc.cluster.local".to_string(),
        ports: vec![Port::new("tcp", 9080, Protocol::Tcp)],
        attributes: ServiceAttributes {
            name: "ratings".to_string(),
            namespace: "bookinfo".to_string(),
            ..Default::default()
        },
    }
}

pub fn context(mesh: MeshConfig, protocol_filters: ProtocolFilterPolicy) -> PushContext {
    let features = FeatureFlags { protocol_filters, ..Default::default() };
    PushContext::new(mesh, features).unwrap().with_services([ratings_service()])
}

pub fn default_context() -> PushContext {
    context(MeshConfig::default(), ProtocolFilterPolicy::default())
}

pub fn names(filters: &[Filter]) -> Vec<&str> {
    filters.iter().map(|f| f.name.as_str()).collect()
}

pub fn last_tcp_proxy(filters: &[Filter]) -> TcpProxy {
    let last = filters.last().expect("chain is never empty");
    assert_eq!(last.name, TCP_PROXY_FILTER_NAME);
    decode_typed_config(last).expect("tcp proxy payload decodes")
}

/// `(cluster, weight)` pairs of a weighted TCP proxy
pub fn weighted_clusters(tcp_proxy: &TcpProxy) -> Vec<(String, u32)> {
    match &tcp_proxy.cluster_specifier {
        Some(ClusterSpecifier::WeightedClusters(weighted)) => {
            weighted.clusters.iter().map(|c| (c.name.clone(), c.weight)).collect()
        }
        other => panic!("expected weighted clusters, got {:?}", other),
    }
}
