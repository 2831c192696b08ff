use meshplane::config::{ProtocolFilterPolicy, SniffingPolicy};
use meshplane::xds::{
    resolve_listener_protocol, ConfigMeta, ListenerProtocol, NetworkFilterBuilder, Port, Protocol,
    Proxy, RouteDestination, TrafficDirection,
};
use proptest::prelude::*;

use super::support::*;

const PROTOCOL_NAMES: [&str; 14] = [
    "tcp", "HTTP", "http2", "grpc", "gRPC-Web", "https", "tls", "mongo", "Redis", "mysql",
    "thrift", "kafka", "zookeeper", "udp",
];

fn protocol_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_-]{0,16}",
        prop::sample::select(PROTOCOL_NAMES.to_vec()).prop_map(String::from),
    ]
}

fn direction() -> impl Strategy<Value = TrafficDirection> {
    prop_oneof![Just(TrafficDirection::Inbound), Just(TrafficDirection::Outbound)]
}

proptest! {
    #[test]
    fn resolver_is_total(
        name in protocol_name(),
        dir in direction(),
        inbound in any::<bool>(),
        outbound in any::<bool>(),
    ) {
        let protocol = Protocol::parse(&name);
        let sniffing = SniffingPolicy { inbound, outbound };
        let resolved = resolve_listener_protocol(protocol, dir, &sniffing);

        let expected = if protocol.is_http() {
            ListenerProtocol::Http
        } else if protocol.is_tcp() || !sniffing.enabled_for(dir) {
            ListenerProtocol::Tcp
        } else {
            ListenerProtocol::Auto
        };
        prop_assert_eq!(resolved, expected);
    }

    #[test]
    fn weighted_clusters_keep_positive_routes_in_order(
        weights in prop::collection::vec(-5i32..100, 2..8),
    ) {
        prop_assume!(weights.iter().any(|w| *w > 0));

        let ctx = context(Default::default(), ProtocolFilterPolicy::default());
        let proxy = Proxy::new(PRODUCTPAGE_NODE);
        let port = Port::new("tcp", 7000, Protocol::Tcp);
        let routes: Vec<_> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| RouteDestination::new(format!("svc-{}.mesh", i), *w))
            .collect();

        let filters = NetworkFilterBuilder::new(&ctx, &proxy)
            .outbound(&routes, &port, &ConfigMeta::new("split", "mesh"))
            .unwrap();

        let expected: Vec<(String, u32)> = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0)
            .map(|(i, w)| (format!("outbound|7000||svc-{}.mesh", i), *w as u32))
            .collect();
        prop_assert_eq!(weighted_clusters(&last_tcp_proxy(&filters)), expected);
    }
}
