//! # Observability
//!
//! Structured logging setup and metrics for the filter-chain renderer.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::FilterChainMetrics;
