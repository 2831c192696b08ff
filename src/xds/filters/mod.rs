//! Typed-config helpers shared by the network filter builders.
//!
//! Every Envoy filter descriptor is a name plus a `google.protobuf.Any`
//! payload. The helpers here encode prost messages into that shape and give
//! the payload a JSON form (base64 bytes) for diagnostics output.
//!
//! Protocol-aware network filters and the dispatch table that decides how
//! they stack in front of the TCP proxy live in [`network`].

pub mod network;

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use envoy_types::pb::envoy::config::listener::v3::{filter::ConfigType, Filter};
use envoy_types::pb::google::protobuf::Any;
use prost::Message;
use serde::{Deserialize, Serialize};

/// Wrapper for binary protobuf payloads serialized as base64 in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Base64Bytes(pub Vec<u8>);

impl Serialize for Base64Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let encoded = BASE64_ENGINE.encode(&self.0);
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let decoded = BASE64_ENGINE
            .decode(encoded.as_bytes())
            .map_err(|err| serde::de::Error::custom(err.to_string()))?;
        Ok(Base64Bytes(decoded))
    }
}

/// JSON-serializable form of a `google.protobuf.Any` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedConfig {
    pub type_url: String,
    #[serde(default)]
    pub value: Base64Bytes,
}

impl TypedConfig {
    /// Creates a typed config from a prost message.
    pub fn from_message<M: Message>(type_url: impl Into<String>, msg: &M) -> Self {
        Self { type_url: type_url.into(), value: Base64Bytes(msg.encode_to_vec()) }
    }

    pub fn from_any(any: &Any) -> Self {
        Self { type_url: any.type_url.clone(), value: Base64Bytes(any.value.clone()) }
    }

    /// Converts to Envoy `Any` structure for xDS protocol.
    pub fn to_any(&self) -> Any {
        Any { type_url: self.type_url.clone(), value: self.value.0.clone() }
    }
}

/// JSON-serializable form of a network filter descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterView {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typed_config: Option<TypedConfig>,
}

impl From<&Filter> for FilterView {
    fn from(filter: &Filter) -> Self {
        let typed_config = match &filter.config_type {
            Some(ConfigType::TypedConfig(any)) => Some(TypedConfig::from_any(any)),
            _ => None,
        };
        Self { name: filter.name.clone(), typed_config }
    }
}

/// Helper for building Envoy `Any` values from prost messages.
pub fn any_from_message<M: Message>(type_url: impl Into<String>, msg: &M) -> Any {
    TypedConfig::from_message(type_url, msg).to_any()
}

/// Build a network filter carrying `msg` as its typed config.
pub fn typed_network_filter<M: Message>(
    name: impl Into<String>,
    type_url: impl Into<String>,
    msg: &M,
) -> Filter {
    Filter {
        name: name.into(),
        config_type: Some(ConfigType::TypedConfig(any_from_message(type_url, msg))),
    }
}

/// Decode the typed config of `filter` as `M`, if it carries one.
pub fn decode_typed_config<M: Message + Default>(filter: &Filter) -> Option<M> {
    match &filter.config_type {
        Some(ConfigType::TypedConfig(any)) => M::decode(any.value.as_slice()).ok(),
        _ => None,
    }
}
