//! Network filter chains for TCP-level listeners
//!
//! [`NetworkFilterBuilder`] renders the ordered filter list for one listener:
//! a TCP proxy (single or weighted clusters) with access logs attached,
//! stacked behind the protocol filter the dispatch table picks for the port.
//! Every entry point is a pure function of the push context and proxy.

use envoy_types::pb::envoy::config::listener::v3::Filter;
use envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::TcpProxy;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::utils::parse_positive_duration;
use crate::xds::access_log::attach_access_logs;
use crate::xds::context::PushContext;
use crate::xds::filters::network::{
    build_network_filter_stack, sni_cluster_filter,
    tcp_proxy::{set_idle_timeout, tcp_proxy_to_cluster, tcp_proxy_to_weighted_clusters},
    tcp_proxy_filter, ProtocolFilterInput,
};
use crate::xds::model::{ConfigMeta, Port, Proxy, RouteDestination, ServiceInstance};
use crate::xds::naming::{
    destination_cluster_name, inbound_cluster_name, inbound_stat_prefix, outbound_stat_prefix,
    weighted_stat_prefix, BLACK_HOLE_CLUSTER,
};
use crate::xds::protocol::{resolve_listener_protocol, ListenerProtocol, TrafficDirection};

/// Renders network filter chains for one proxy within one push
#[derive(Debug, Clone, Copy)]
pub struct NetworkFilterBuilder<'a> {
    ctx: &'a PushContext,
    proxy: &'a Proxy,
}

impl<'a> NetworkFilterBuilder<'a> {
    pub fn new(ctx: &'a PushContext, proxy: &'a Proxy) -> Self {
        Self { ctx, proxy }
    }

    /// Listener transport for `port` in `direction`
    pub fn listener_protocol(&self, port: &Port, direction: TrafficDirection) -> ListenerProtocol {
        resolve_listener_protocol(port.protocol(), direction, &self.ctx.features.sniffing)
    }

    /// Filter chain for an inbound listener in front of one service instance
    pub fn inbound(&self, instance: &ServiceInstance) -> Vec<Filter> {
        let port = &instance.service_port;
        let _span = crate::render_span!("inbound", self.proxy.id, port = port.port).entered();

        let cluster_name = inbound_cluster_name(&instance.service, port);
        let stat_prefix =
            inbound_stat_prefix(&self.ctx.mesh, &cluster_name, &instance.service, port);
        let tcp_proxy = tcp_proxy_to_cluster(&stat_prefix, &cluster_name);

        self.finish(TrafficDirection::Inbound, port, tcp_proxy, &stat_prefix, &cluster_name)
    }

    /// Filter chain for an outbound listener routing to `routes`
    ///
    /// One route renders a single-destination chain, several render a
    /// weighted chain whose stat prefix comes from `config`.
    pub fn outbound(
        &self,
        routes: &[RouteDestination],
        port: &Port,
        config: &ConfigMeta,
    ) -> Result<Vec<Filter>> {
        match routes {
            [] => Err(Error::validation_field(
                "Outbound filter chain requires at least one route destination",
                "routes",
            )),
            [route] => {
                let destination = &route.destination;
                let service = self.ctx.service_for_hostname(&destination.host);
                let cluster_name = destination_cluster_name(destination, service, port.port);
                let stat_prefix = outbound_stat_prefix(
                    &self.ctx.mesh,
                    &cluster_name,
                    destination,
                    service,
                    port,
                );
                Ok(self.outbound_single(&stat_prefix, &cluster_name, port))
            }
            _ => self.outbound_weighted(routes, port, config),
        }
    }

    /// Filter chain sending every connection to `cluster_name`
    pub fn outbound_single(&self, stat_prefix: &str, cluster_name: &str, port: &Port) -> Vec<Filter> {
        let _span = crate::render_span!("outbound", self.proxy.id, port = port.port).entered();

        let mut tcp_proxy = tcp_proxy_to_cluster(stat_prefix, cluster_name);
        self.apply_idle_timeout(&mut tcp_proxy);

        self.finish(TrafficDirection::Outbound, port, tcp_proxy, stat_prefix, cluster_name)
    }

    /// Filter chain splitting connections across `routes` by weight
    ///
    /// Routes with a weight of zero or less are skipped. Protocol filters that
    /// embed a single upstream get the first remaining cluster.
    pub fn outbound_weighted(
        &self,
        routes: &[RouteDestination],
        port: &Port,
        config: &ConfigMeta,
    ) -> Result<Vec<Filter>> {
        let _span =
            crate::render_span!("outbound_weighted", self.proxy.id, port = port.port).entered();

        let clusters: Vec<(String, u32)> = routes
            .iter()
            .filter(|route| route.weight > 0)
            .map(|route| {
                let destination = &route.destination;
                let service = self.ctx.service_for_hostname(&destination.host);
                (destination_cluster_name(destination, service, port.port), route.weight as u32)
            })
            .collect();

        let representative = match clusters.first() {
            Some((name, _)) => name.clone(),
            None => {
                return Err(Error::validation_field(
                    format!(
                        "Weighted routes for {}/{} have no destination with positive weight",
                        config.namespace, config.name
                    ),
                    "routes",
                ))
            }
        };

        let stat_prefix = weighted_stat_prefix(&config.name, &config.namespace);
        let mut tcp_proxy = tcp_proxy_to_weighted_clusters(&stat_prefix, clusters);
        self.apply_idle_timeout(&mut tcp_proxy);

        Ok(self.finish(TrafficDirection::Outbound, port, tcp_proxy, &stat_prefix, &representative))
    }

    /// Filter chain for a gateway port that passes TLS through by SNI
    ///
    /// The SNI cluster filter picks the upstream at connection time; the TCP
    /// proxy behind it only names the black hole as a placeholder.
    pub fn gateway_auto_passthrough(&self, port: &Port) -> Vec<Filter> {
        let mut filters = vec![sni_cluster_filter()];
        filters.extend(self.outbound_single(BLACK_HOLE_CLUSTER, BLACK_HOLE_CLUSTER, port));
        filters
    }

    fn apply_idle_timeout(&self, tcp_proxy: &mut TcpProxy) {
        let Some(raw) = self.proxy.metadata.idle_timeout.as_deref() else {
            return;
        };

        match parse_positive_duration(raw) {
            Some(timeout) => set_idle_timeout(tcp_proxy, timeout),
            None => debug!(
                node_id = %self.proxy.id,
                idle_timeout = raw,
                "Ignoring idle timeout metadata that is not a positive duration"
            ),
        }
    }

    fn finish(
        &self,
        direction: TrafficDirection,
        port: &Port,
        mut tcp_proxy: TcpProxy,
        stat_prefix: &str,
        cluster_name: &str,
    ) -> Vec<Filter> {
        attach_access_logs(&self.ctx.mesh, self.ctx.grpc_access_log(), &mut tcp_proxy);

        let protocol = port.protocol();
        let input = ProtocolFilterInput { stat_prefix, cluster_name };
        let filters = build_network_filter_stack(
            protocol,
            &self.ctx.features.protocol_filters,
            tcp_proxy_filter(&tcp_proxy),
            &input,
        );

        self.ctx.metrics().record_chain(direction, protocol, filters.len());
        debug!(
            node_id = %self.proxy.id,
            %direction,
            %protocol,
            cluster = cluster_name,
            filters = ?filters.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            "Built network filter chain"
        );

        filters
    }
}
