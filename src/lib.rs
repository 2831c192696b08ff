//! # Meshplane
//!
//! Meshplane renders the network-level configuration a service mesh control
//! plane pushes to Envoy sidecars and gateways for TCP traffic. Given a
//! read-only snapshot of mesh config, feature flags and service discovery, it
//! decides:
//!
//! - which listener transport a port gets (HTTP, raw TCP, or sniffed);
//! - which network filters front the port, in which order, with which
//!   cluster names, stat prefixes and access logs.
//!
//! ## Architecture
//!
//! ```text
//! MeshConfig + FeatureFlags + Services → PushContext
//!                                           ↓
//!             Proxy + listener inputs → NetworkFilterBuilder → Vec<Filter>
//!                                           ↓
//!                        protocol dispatch table + access log sinks
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meshplane::xds::{ConfigMeta, NetworkFilterBuilder, Port, Protocol, Proxy, RouteDestination};
//! use meshplane::{FeatureFlags, MeshConfig, PushContext, Result};
//!
//! fn main() -> Result<()> {
//!     let ctx = PushContext::new(MeshConfig::default(), FeatureFlags::from_env())?;
//!     let proxy = Proxy::new("sidecar~10.0.0.1~app-0.default~default.svc.cluster.local");
//!     let routes = vec![RouteDestination::new("cache.default.svc.cluster.local", 100)];
//!     let port = Port::new("redis", 6379, Protocol::Redis);
//!
//!     let filters = NetworkFilterBuilder::new(&ctx, &proxy).outbound(
//!         &routes,
//!         &port,
//!         &ConfigMeta::default(),
//!     )?;
//!     println!("{} filters", filters.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod utils;
pub mod xds;

// Re-export commonly used types
pub use config::{FeatureFlags, LoggingConfig, MeshConfig, ProtocolFilterPolicy, SniffingPolicy};
pub use errors::{Error, Result};
pub use xds::{NetworkFilterBuilder, PushContext};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "meshplane");
    }
}
