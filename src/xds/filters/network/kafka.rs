//! Kafka broker network filter
//!
//! Declared locally for the same reason as the MySQL proxy: the message is
//! part of Envoy's contrib API.

use envoy_types::pb::envoy::config::listener::v3::Filter;

use crate::xds::filters::typed_network_filter;

pub const KAFKA_BROKER_FILTER_NAME: &str = "envoy.filters.network.kafka_broker";
pub const KAFKA_BROKER_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.kafka_broker.v3.KafkaBroker";

/// `envoy.extensions.filters.network.kafka_broker.v3.KafkaBroker`
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct KafkaBroker {
    #[prost(string, tag = "1")]
    pub stat_prefix: String,
}

/// Build a Kafka broker filter; Envoy prefixes its stats with `kafka.`.
pub fn build_kafka_filter(stat_prefix: &str) -> Filter {
    let kafka_broker = KafkaBroker { stat_prefix: stat_prefix.to_string() };
    typed_network_filter(KAFKA_BROKER_FILTER_NAME, KAFKA_BROKER_TYPE_URL, &kafka_broker)
}
