//! # Configuration Settings
//!
//! Mesh-wide policy snapshot and process-wide feature flags read by the
//! filter-chain core. Nothing here is mutated after startup.

use crate::errors::{Error, Result};
use crate::xds::protocol::TrafficDirection;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// Placeholders accepted in cluster stat name patterns
pub const STAT_PATTERN_TOKENS: [&str; 5] =
    ["%SERVICE%", "%SERVICE_FQDN%", "%SUBSET_NAME%", "%SERVICE_PORT%", "%SERVICE_PORT_NAME%"];

static STAT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%[A-Z_]+%").expect("stat token pattern is a valid regex")
});

/// Encoding of file access log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLogEncoding {
    #[default]
    Text,
    Json,
}

/// Mesh-wide policy consumed while rendering listeners
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshConfig {
    /// Path for the file access log sink; empty disables it
    pub access_log_file: String,

    /// Custom access log format; empty selects the built-in default
    pub access_log_format: String,

    /// Line encoding for the file access log
    pub access_log_encoding: AccessLogEncoding,

    /// Stream TCP access logs to the Envoy access log service
    pub enable_envoy_access_log_service: bool,

    /// Stat prefix pattern for inbound clusters; empty uses the cluster name
    #[validate(custom(function = "validate_stat_pattern"))]
    pub inbound_cluster_stat_name: String,

    /// Stat prefix pattern for outbound clusters; empty uses the cluster name
    #[validate(custom(function = "validate_stat_pattern"))]
    pub outbound_cluster_stat_name: String,
}

impl MeshConfig {
    /// Load a mesh config snapshot from a YAML file and validate it
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the mesh config
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        if self.access_log_encoding == AccessLogEncoding::Json && !self.access_log_format.is_empty()
        {
            let parsed: serde_json::Value = serde_json::from_str(&self.access_log_format)?;
            if !parsed.is_object() {
                return Err(Error::validation_field(
                    "JSON access log format must be an object",
                    "accessLogFormat",
                ));
            }
        }

        Ok(())
    }

    /// Stat name pattern configured for `direction`, if any
    pub fn cluster_stat_name(&self, direction: TrafficDirection) -> Option<&str> {
        let pattern = match direction {
            TrafficDirection::Inbound => &self.inbound_cluster_stat_name,
            TrafficDirection::Outbound => &self.outbound_cluster_stat_name,
        };
        if pattern.is_empty() {
            None
        } else {
            Some(pattern.as_str())
        }
    }
}

fn validate_stat_pattern(pattern: &str) -> std::result::Result<(), ValidationError> {
    let unknown = STAT_TOKEN_RE
        .find_iter(pattern)
        .map(|m| m.as_str())
        .find(|token| !STAT_PATTERN_TOKENS.contains(token));

    match unknown {
        Some(token) => {
            let mut error = ValidationError::new("unknown_stat_token");
            error.message = Some(format!("Unknown stat pattern token {}", token).into());
            Err(error)
        }
        None => Ok(()),
    }
}

/// Per-direction protocol sniffing switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniffingPolicy {
    pub inbound: bool,
    pub outbound: bool,
}

impl Default for SniffingPolicy {
    fn default() -> Self {
        Self { inbound: true, outbound: true }
    }
}

impl SniffingPolicy {
    pub fn enabled_for(&self, direction: TrafficDirection) -> bool {
        match direction {
            TrafficDirection::Inbound => self.inbound,
            TrafficDirection::Outbound => self.outbound,
        }
    }
}

/// Protocol proxies that are only injected when switched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFilterFlag {
    Redis,
    MySql,
    Thrift,
    Kafka,
    ZooKeeper,
}

/// Feature switches for protocol-aware network filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolFilterPolicy {
    pub redis: bool,
    pub mysql: bool,
    pub thrift: bool,
    pub kafka: bool,
    pub zookeeper: bool,
}

impl ProtocolFilterPolicy {
    /// Every protocol filter switched on
    pub fn all_enabled() -> Self {
        Self { redis: true, mysql: true, thrift: true, kafka: true, zookeeper: true }
    }

    pub fn is_enabled(&self, flag: ProtocolFilterFlag) -> bool {
        match flag {
            ProtocolFilterFlag::Redis => self.redis,
            ProtocolFilterFlag::MySql => self.mysql,
            ProtocolFilterFlag::Thrift => self.thrift,
            ProtocolFilterFlag::Kafka => self.kafka,
            ProtocolFilterFlag::ZooKeeper => self.zookeeper,
        }
    }
}

/// Process-wide feature flags, read once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub sniffing: SniffingPolicy,
    pub protocol_filters: ProtocolFilterPolicy,
}

impl FeatureFlags {
    /// Create feature flags from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create feature flags from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str, default: bool| {
            lookup(key).and_then(|value| parse_bool(&value)).unwrap_or(default)
        };

        Self {
            sniffing: SniffingPolicy {
                inbound: flag("MESHPLANE_ENABLE_PROTOCOL_SNIFFING_FOR_INBOUND", true),
                outbound: flag("MESHPLANE_ENABLE_PROTOCOL_SNIFFING_FOR_OUTBOUND", true),
            },
            protocol_filters: ProtocolFilterPolicy {
                redis: flag("MESHPLANE_ENABLE_REDIS_FILTER", false),
                mysql: flag("MESHPLANE_ENABLE_MYSQL_FILTER", false),
                thrift: flag("MESHPLANE_ENABLE_THRIFT_FILTER", false),
                kafka: flag("MESHPLANE_ENABLE_KAFKA_FILTER", false),
                zookeeper: flag("MESHPLANE_ENABLE_ZOOKEEPER_FILTER", false),
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Enable JSON structured logging
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    /// Create logging config from environment variables
    pub fn from_env() -> Self {
        let level = std::env::var("MESHPLANE_LOG_LEVEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        let json = std::env::var("MESHPLANE_LOG_JSON")
            .ok()
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false);

        Self { level, json }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn feature_flag_defaults() {
        let flags = FeatureFlags::from_lookup(lookup(&[]));
        assert!(flags.sniffing.inbound);
        assert!(flags.sniffing.outbound);
        assert_eq!(flags.protocol_filters, ProtocolFilterPolicy::default());
        assert_eq!(flags, FeatureFlags::default());
    }

    #[test]
    fn feature_flags_from_lookup() {
        let flags = FeatureFlags::from_lookup(lookup(&[
            ("MESHPLANE_ENABLE_PROTOCOL_SNIFFING_FOR_INBOUND", "false"),
            ("MESHPLANE_ENABLE_REDIS_FILTER", "TRUE"),
            ("MESHPLANE_ENABLE_KAFKA_FILTER", "1"),
            ("MESHPLANE_ENABLE_MYSQL_FILTER", "definitely"),
        ]));

        assert!(!flags.sniffing.inbound);
        assert!(flags.sniffing.outbound);
        assert!(flags.protocol_filters.redis);
        assert!(flags.protocol_filters.kafka);
        assert!(!flags.protocol_filters.mysql, "unparsable values keep the default");
        assert!(!flags.protocol_filters.thrift);
    }

    #[test]
    fn sniffing_is_per_direction() {
        let policy = SniffingPolicy { inbound: false, outbound: true };
        assert!(!policy.enabled_for(TrafficDirection::Inbound));
        assert!(policy.enabled_for(TrafficDirection::Outbound));
    }

    #[test]
    fn protocol_filter_policy_flags() {
        let policy = ProtocolFilterPolicy { thrift: true, ..Default::default() };
        assert!(policy.is_enabled(ProtocolFilterFlag::Thrift));
        assert!(!policy.is_enabled(ProtocolFilterFlag::Redis));

        let all = ProtocolFilterPolicy::all_enabled();
        for flag in [
            ProtocolFilterFlag::Redis,
            ProtocolFilterFlag::MySql,
            ProtocolFilterFlag::Thrift,
            ProtocolFilterFlag::Kafka,
            ProtocolFilterFlag::ZooKeeper,
        ] {
            assert!(all.is_enabled(flag));
        }
    }

    #[test]
    fn mesh_config_stat_name_by_direction() {
        let mesh = MeshConfig {
            outbound_cluster_stat_name: "%SERVICE%_%SERVICE_PORT%".to_string(),
            ..Default::default()
        };
        assert_eq!(mesh.cluster_stat_name(TrafficDirection::Inbound), None);
        assert_eq!(
            mesh.cluster_stat_name(TrafficDirection::Outbound),
            Some("%SERVICE%_%SERVICE_PORT%")
        );
    }

    #[test]
    fn mesh_config_rejects_unknown_stat_tokens() {
        let mesh = MeshConfig {
            inbound_cluster_stat_name: "%SERVICE%.%CLUSTER_NAME%".to_string(),
            ..Default::default()
        };
        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("Validation error"));

        let valid = MeshConfig {
            inbound_cluster_stat_name: "%SERVICE_FQDN%_%SUBSET_NAME%_%SERVICE_PORT_NAME%".to_string(),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn mesh_config_rejects_non_object_json_format() {
        let mesh = MeshConfig {
            access_log_encoding: AccessLogEncoding::Json,
            access_log_format: "[1, 2]".to_string(),
            ..Default::default()
        };
        assert!(matches!(mesh.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn mesh_config_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "accessLogFile: /dev/stdout\naccessLogEncoding: JSON\nenableEnvoyAccessLogService: true\noutboundClusterStatName: \"%SERVICE%\""
        )
        .unwrap();

        let mesh = MeshConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(mesh.access_log_file, "/dev/stdout");
        assert_eq!(mesh.access_log_encoding, AccessLogEncoding::Json);
        assert!(mesh.enable_envoy_access_log_service);
        assert_eq!(mesh.outbound_cluster_stat_name, "%SERVICE%");
        assert!(mesh.inbound_cluster_stat_name.is_empty());
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert!(config.validate().is_ok());
    }
}
