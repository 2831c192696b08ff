//! Per-push snapshot bundle
//!
//! A [`PushContext`] carries everything the listener pipeline reads while
//! rendering one push: mesh config, feature flags, the service index and the
//! shared gRPC access log sink. It is immutable once built and cheap to share
//! across rendering workers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{FeatureFlags, MeshConfig};
use crate::errors::Result;
use crate::observability::FilterChainMetrics;
use crate::xds::access_log::TcpGrpcAccessLog;
use crate::xds::model::Service;

#[derive(Debug, Clone)]
pub struct PushContext {
    pub mesh: MeshConfig,
    pub features: FeatureFlags,
    services: HashMap<String, Service>,
    grpc_access_log: Arc<TcpGrpcAccessLog>,
    metrics: FilterChainMetrics,
}

impl PushContext {
    /// Build a context with a freshly constructed gRPC access log sink
    pub fn new(mesh: MeshConfig, features: FeatureFlags) -> Result<Self> {
        Self::with_access_log(mesh, features, Arc::new(TcpGrpcAccessLog::new()))
    }

    /// Build a context that shares an existing gRPC access log sink
    pub fn with_access_log(
        mesh: MeshConfig,
        features: FeatureFlags,
        grpc_access_log: Arc<TcpGrpcAccessLog>,
    ) -> Result<Self> {
        mesh.validate()?;

        let metrics = FilterChainMetrics::new();
        metrics.describe();

        Ok(Self { mesh, features, services: HashMap::new(), grpc_access_log, metrics })
    }

    /// Index `services` by hostname; a later entry replaces an earlier one
    pub fn with_services<I>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = Service>,
    {
        self.services
            .extend(services.into_iter().map(|service| (service.hostname.clone(), service)));
        self
    }

    pub fn service_for_hostname(&self, hostname: &str) -> Option<&Service> {
        self.services.get(hostname)
    }

    pub fn grpc_access_log(&self) -> &TcpGrpcAccessLog {
        &self.grpc_access_log
    }

    pub fn metrics(&self) -> &FilterChainMetrics {
        &self.metrics
    }
}
