use meshplane::config::{MeshConfig, ProtocolFilterPolicy};
use meshplane::xds::access_log::{FILE_ACCESS_LOG_NAME, TCP_GRPC_ACCESS_LOG_NAME};
use meshplane::xds::filters::network::{
    MONGO_PROXY_FILTER_NAME, MYSQL_PROXY_FILTER_NAME, REDIS_PROXY_FILTER_NAME,
    SNI_CLUSTER_FILTER_NAME, TCP_PROXY_FILTER_NAME,
};
use meshplane::xds::naming::BLACK_HOLE_CLUSTER;
use meshplane::xds::{
    ConfigMeta, NetworkFilterBuilder, Port, Protocol, Proxy, RouteDestination, ServiceInstance,
};

use super::support::*;

fn single_route_chain(ctx: &meshplane::PushContext, protocol: Protocol) -> Vec<String> {
    let proxy = Proxy::new(PRODUCTPAGE_NODE);
    let routes = vec![RouteDestination::new("ratings.bookinfo.svc.cluster.local", 100)];
    let port = Port::new("tcp-db", 9080, protocol);
    let filters = NetworkFilterBuilder::new(ctx, &proxy)
        .outbound(&routes, &port, &ConfigMeta::default())
        .unwrap();
    filters.into_iter().map(|f| f.name).collect()
}

#[test]
fn redis_is_terminating_only_when_enabled() {
    let policy = ProtocolFilterPolicy { redis: true, ..Default::default() };
    let on = context(MeshConfig::default(), policy);
    assert_eq!(single_route_chain(&on, Protocol::Redis), vec![REDIS_PROXY_FILTER_NAME]);
    assert_eq!(single_route_chain(&default_context(), Protocol::Redis), vec![TCP_PROXY_FILTER_NAME]);
}

#[test]
fn mongo_always_precedes_tcp_proxy() {
    for policy in [ProtocolFilterPolicy::default(), ProtocolFilterPolicy::all_enabled()] {
        let ctx = context(MeshConfig::default(), policy);
        assert_eq!(
            single_route_chain(&ctx, Protocol::Mongo),
            vec![MONGO_PROXY_FILTER_NAME, TCP_PROXY_FILTER_NAME]
        );
    }
}

#[test]
fn mysql_observes_only_when_enabled() {
    let policy = ProtocolFilterPolicy { mysql: true, ..Default::default() };
    let on = context(MeshConfig::default(), policy);
    assert_eq!(
        single_route_chain(&on, Protocol::MySql),
        vec![MYSQL_PROXY_FILTER_NAME, TCP_PROXY_FILTER_NAME]
    );
    assert_eq!(single_route_chain(&default_context(), Protocol::MySql), vec![TCP_PROXY_FILTER_NAME]);
}

#[test]
fn weighted_chain_skips_zero_weight_routes() {
    let ctx = default_context();
    let proxy = Proxy::new(PRODUCTPAGE_NODE);
    let routes = vec![
        RouteDestination::new("a.bookinfo.svc.cluster.local", 70),
        RouteDestination::new("b.bookinfo.svc.cluster.local", 30),
        RouteDestination::new("c.bookinfo.svc.cluster.local", 0),
    ];
    let port = Port::new("tcp", 9080, Protocol::Tcp);

    let filters = NetworkFilterBuilder::new(&ctx, &proxy)
        .outbound(&routes, &port, &ConfigMeta::new("ab-split", "bookinfo"))
        .unwrap();
    let tcp_proxy = last_tcp_proxy(&filters);

    assert_eq!(tcp_proxy.stat_prefix, "ab-split.bookinfo");
    assert_eq!(
        weighted_clusters(&tcp_proxy),
        vec![
            ("outbound|9080||a.bookinfo.svc.cluster.local".to_string(), 70),
            ("outbound|9080||b.bookinfo.svc.cluster.local".to_string(), 30),
        ]
    );
}

#[test]
fn weighted_chain_applies_idle_timeout() {
    let ctx = default_context();
    let proxy = Proxy::new(PRODUCTPAGE_NODE).with_idle_timeout("1h15m");
    let routes = vec![
        RouteDestination::new("ratings.bookinfo.svc.cluster.local", 50).with_subset("v1"),
        RouteDestination::new("ratings.bookinfo.svc.cluster.local", 50).with_subset("v2"),
    ];
    let port = Port::new("tcp", 9080, Protocol::Tcp);

    let filters = NetworkFilterBuilder::new(&ctx, &proxy)
        .outbound(&routes, &port, &ConfigMeta::new("ratings", "bookinfo"))
        .unwrap();
    let timeout = last_tcp_proxy(&filters).idle_timeout.unwrap();
    assert_eq!(timeout.seconds, 4500);
    assert_eq!(timeout.nanos, 0);
}

#[test]
fn passthrough_is_sni_then_black_hole_chain() {
    let mesh = MeshConfig { access_log_file: "/dev/stdout".to_string(), ..Default::default() };
    let ctx = context(mesh, ProtocolFilterPolicy::all_enabled());
    let proxy = Proxy::new("router~10.1.0.9~ingress-gateway.mesh-system~mesh-system.svc.cluster.local");
    let port = Port::new("tls", 15443, Protocol::Tls);
    let builder = NetworkFilterBuilder::new(&ctx, &proxy);

    let passthrough = builder.gateway_auto_passthrough(&port);
    let single = builder.outbound_single(BLACK_HOLE_CLUSTER, BLACK_HOLE_CLUSTER, &port);

    assert_eq!(passthrough[0].name, SNI_CLUSTER_FILTER_NAME);
    assert!(passthrough[0].config_type.is_none());
    assert_eq!(&passthrough[1..], single.as_slice());
}

#[test]
fn access_logs_attach_file_before_grpc() {
    let mesh = MeshConfig {
        access_log_file: "/dev/stdout".to_string(),
        enable_envoy_access_log_service: true,
        ..Default::default()
    };
    let ctx = context(mesh, ProtocolFilterPolicy::default());
    let proxy = Proxy::new(PRODUCTPAGE_NODE);
    let instance = ServiceInstance {
        service: ratings_service(),
        service_port: Port::new("tcp", 9080, Protocol::Tcp),
    };

    let filters = NetworkFilterBuilder::new(&ctx, &proxy).inbound(&instance);
    let logs: Vec<_> =
        last_tcp_proxy(&filters).access_log.into_iter().map(|log| log.name).collect();
    assert_eq!(logs, vec![FILE_ACCESS_LOG_NAME, TCP_GRPC_ACCESS_LOG_NAME]);

    let quiet = NetworkFilterBuilder::new(&default_context(), &proxy).inbound(&instance);
    assert!(last_tcp_proxy(&quiet).access_log.is_empty());
}

#[test]
fn inbound_stat_pattern_is_applied() {
    let mesh = MeshConfig {
        inbound_cluster_stat_name: "inbound_%SERVICE%_%SERVICE_PORT_NAME%".to_string(),
        ..Default::default()
    };
    let ctx = context(mesh, ProtocolFilterPolicy::default());
    let proxy = Proxy::new(PRODUCTPAGE_NODE);
    let instance = ServiceInstance {
        service: ratings_service(),
        service_port: Port::new("tcp", 9080, Protocol::Tcp),
    };

    let filters = NetworkFilterBuilder::new(&ctx, &proxy).inbound(&instance);
    assert_eq!(last_tcp_proxy(&filters).stat_prefix, "inbound_ratings.bookinfo_tcp");
}

#[test]
fn rendering_is_idempotent() {
    let mesh = MeshConfig {
        access_log_file: "/dev/stdout".to_string(),
        enable_envoy_access_log_service: true,
        ..Default::default()
    };
    let ctx = context(mesh, ProtocolFilterPolicy::all_enabled());
    let proxy = Proxy::new(PRODUCTPAGE_NODE).with_idle_timeout("30s");
    let routes = vec![
        RouteDestination::new("ratings.bookinfo.svc.cluster.local", 90).with_subset("v1"),
        RouteDestination::new("ratings.bookinfo.svc.cluster.local", 10).with_subset("v2"),
    ];
    let meta = ConfigMeta::new("ratings", "bookinfo");
    let builder = NetworkFilterBuilder::new(&ctx, &proxy);

    for protocol in Protocol::KNOWN {
        let port = Port::new("tcp", 9080, protocol);
        let first = builder.outbound(&routes, &port, &meta).unwrap();
        let second = builder.outbound(&routes, &port, &meta).unwrap();
        assert_eq!(first, second, "{}", protocol);
    }

    let tcp = builder.outbound(&routes, &Port::new("tcp", 9080, Protocol::Tcp), &meta).unwrap();
    assert_eq!(names(&tcp), vec![TCP_PROXY_FILTER_NAME]);
}
