//! # Configuration Management
//!
//! Read-only configuration snapshots consumed by the filter-chain core: the
//! mesh-wide policy, the feature flags gating protocol sniffing and protocol
//! proxies, and logging settings for the binary.

pub mod settings;

pub use settings::{
    AccessLogEncoding, FeatureFlags, LoggingConfig, MeshConfig, ProtocolFilterFlag,
    ProtocolFilterPolicy, SniffingPolicy, STAT_PATTERN_TOKENS,
};
