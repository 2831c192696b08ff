//! # Metrics Collection
//!
//! Counters and histograms for rendered filter chains, emitted through the
//! `metrics` facade. Without an installed recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

use crate::xds::protocol::{Protocol, TrafficDirection};

pub const FILTER_CHAINS_TOTAL: &str = "network_filter_chains_total";
pub const FILTER_CHAIN_LENGTH: &str = "network_filter_chain_length";

/// Records every network filter chain the builder produces
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterChainMetrics;

impl FilterChainMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Register metric descriptions with the installed recorder
    pub fn describe(&self) {
        describe_counter!(FILTER_CHAINS_TOTAL, Unit::Count, "Network filter chains rendered");
        describe_histogram!(
            FILTER_CHAIN_LENGTH,
            Unit::Count,
            "Number of filters in each rendered network filter chain"
        );
    }

    /// Record a rendered chain
    pub fn record_chain(&self, direction: TrafficDirection, protocol: Protocol, length: usize) {
        let labels =
            [("direction", direction.as_str().to_string()), ("protocol", protocol.to_string())];
        counter!(FILTER_CHAINS_TOTAL, &labels).increment(1);

        let direction_label = [("direction", direction.as_str().to_string())];
        histogram!(FILTER_CHAIN_LENGTH, &direction_label).record(length as f64);
    }
}
