//! Access logging for TCP proxy filters
//!
//! Two sinks can be attached to a TCP proxy, each switched by mesh config:
//! a file sink writing to `MeshConfig::access_log_file`, and a gRPC sink
//! streaming to the Envoy access log service. The gRPC sink never varies per
//! listener, so [`TcpGrpcAccessLog`] builds it once and is shared by reference.

use envoy_types::pb::envoy::config::{
    accesslog::v3::{access_log::ConfigType as AccessLogConfigType, AccessLog},
    core::v3::{
        data_source, grpc_service, substitution_format_string::Format, ApiVersion, DataSource,
        GrpcService, SubstitutionFormatString,
    },
};
use envoy_types::pb::envoy::extensions::access_loggers::file::v3::{
    file_access_log::AccessLogFormat, FileAccessLog,
};
use envoy_types::pb::envoy::extensions::access_loggers::grpc::v3::{
    CommonGrpcAccessLogConfig, TcpGrpcAccessLogConfig,
};
use envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::TcpProxy;
use envoy_types::pb::google::protobuf::{
    value::Kind, ListValue, Struct as ProstStruct, Value as ProstValue,
};
use tracing::warn;

use crate::config::{AccessLogEncoding, MeshConfig};
use crate::xds::filters::any_from_message;

pub const FILE_ACCESS_LOG_NAME: &str = "envoy.access_loggers.file";
const FILE_ACCESS_LOG_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.access_loggers.file.v3.FileAccessLog";

pub const TCP_GRPC_ACCESS_LOG_NAME: &str = "envoy.access_loggers.tcp_grpc";
const TCP_GRPC_ACCESS_LOG_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.access_loggers.grpc.v3.TcpGrpcAccessLogConfig";

/// Cluster fronting the Envoy access log service
pub const ENVOY_ACCESS_LOG_CLUSTER: &str = "envoy_accesslog_service";

/// Log name reported to the access log service for TCP traffic
pub const TCP_ACCESS_LOG_NAME: &str = "tcp_envoy_accesslog";

/// Filter state written by the peer metadata exchange
pub const FILTER_STATE_OBJECTS_TO_LOG: [&str; 4] = [
    "wasm.upstream_peer",
    "wasm.upstream_peer_id",
    "wasm.downstream_peer",
    "wasm.downstream_peer_id",
];

/// Default text line for the file sink
pub const DEFAULT_TEXT_FORMAT: &str = "[%START_TIME%] \"%REQ(:METHOD)% %REQ(X-ENVOY-ORIGINAL-PATH?:PATH)% %PROTOCOL%\" \
%RESPONSE_CODE% %RESPONSE_FLAGS% \"%UPSTREAM_TRANSPORT_FAILURE_REASON%\" %BYTES_RECEIVED% %BYTES_SENT% \
%DURATION% %RESP(X-ENVOY-UPSTREAM-SERVICE-TIME)% \"%REQ(X-FORWARDED-FOR)%\" \"%REQ(USER-AGENT)%\" \
\"%REQ(X-REQUEST-ID)%\" \"%REQ(:AUTHORITY)%\" \"%UPSTREAM_HOST%\" %UPSTREAM_CLUSTER% \
%UPSTREAM_LOCAL_ADDRESS% %DOWNSTREAM_LOCAL_ADDRESS% %DOWNSTREAM_REMOTE_ADDRESS% \
%REQUESTED_SERVER_NAME% %ROUTE_NAME%\n";

/// Default key map for the JSON file sink
pub const DEFAULT_JSON_FORMAT: [(&str, &str); 21] = [
    ("start_time", "%START_TIME%"),
    ("method", "%REQ(:METHOD)%"),
    ("path", "%REQ(X-ENVOY-ORIGINAL-PATH?:PATH)%"),
    ("protocol", "%PROTOCOL%"),
    ("response_code", "%RESPONSE_CODE%"),
    ("response_flags", "%RESPONSE_FLAGS%"),
    ("upstream_transport_failure_reason", "%UPSTREAM_TRANSPORT_FAILURE_REASON%"),
    ("bytes_received", "%BYTES_RECEIVED%"),
    ("bytes_sent", "%BYTES_SENT%"),
    ("duration", "%DURATION%"),
    ("upstream_service_time", "%RESP(X-ENVOY-UPSTREAM-SERVICE-TIME)%"),
    ("x_forwarded_for", "%REQ(X-FORWARDED-FOR)%"),
    ("user_agent", "%REQ(USER-AGENT)%"),
    ("request_id", "%REQ(X-REQUEST-ID)%"),
    ("authority", "%REQ(:AUTHORITY)%"),
    ("upstream_host", "%UPSTREAM_HOST%"),
    ("upstream_cluster", "%UPSTREAM_CLUSTER%"),
    ("upstream_local_address", "%UPSTREAM_LOCAL_ADDRESS%"),
    ("downstream_local_address", "%DOWNSTREAM_LOCAL_ADDRESS%"),
    ("downstream_remote_address", "%DOWNSTREAM_REMOTE_ADDRESS%"),
    ("requested_server_name", "%REQUESTED_SERVER_NAME%"),
];

/// The gRPC access log sink shared by every TCP proxy
#[derive(Debug, Clone, PartialEq)]
pub struct TcpGrpcAccessLog {
    access_log: AccessLog,
}

impl TcpGrpcAccessLog {
    /// Build the sink. Do this once per process and share the value.
    pub fn new() -> Self {
        let grpc_service = GrpcService {
            target_specifier: Some(grpc_service::TargetSpecifier::EnvoyGrpc(
                grpc_service::EnvoyGrpc {
                    cluster_name: ENVOY_ACCESS_LOG_CLUSTER.to_string(),
                    ..Default::default()
                },
            )),
            ..Default::default()
        };

        let config = TcpGrpcAccessLogConfig {
            common_config: Some(CommonGrpcAccessLogConfig {
                log_name: TCP_ACCESS_LOG_NAME.to_string(),
                grpc_service: Some(grpc_service),
                transport_api_version: ApiVersion::V3 as i32,
                filter_state_objects_to_log: FILTER_STATE_OBJECTS_TO_LOG
                    .iter()
                    .map(|key| key.to_string())
                    .collect(),
                ..Default::default()
            }),
        };

        Self {
            access_log: AccessLog {
                name: TCP_GRPC_ACCESS_LOG_NAME.to_string(),
                filter: None,
                config_type: Some(AccessLogConfigType::TypedConfig(any_from_message(
                    TCP_GRPC_ACCESS_LOG_TYPE_URL,
                    &config,
                ))),
            },
        }
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }
}

impl Default for TcpGrpcAccessLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the file sink for the mesh's access log path and format
pub fn build_file_access_log(mesh: &MeshConfig) -> AccessLog {
    let format = match mesh.access_log_encoding {
        AccessLogEncoding::Text => {
            let text = if mesh.access_log_format.is_empty() {
                DEFAULT_TEXT_FORMAT.to_string()
            } else {
                mesh.access_log_format.clone()
            };
            Format::TextFormatSource(inline_text(text))
        }
        AccessLogEncoding::Json => Format::JsonFormat(json_log_format(&mesh.access_log_format)),
    };

    let file_log = FileAccessLog {
        path: mesh.access_log_file.clone(),
        access_log_format: Some(AccessLogFormat::LogFormat(SubstitutionFormatString {
            format: Some(format),
            ..Default::default()
        })),
    };

    AccessLog {
        name: FILE_ACCESS_LOG_NAME.to_string(),
        filter: None,
        config_type: Some(AccessLogConfigType::TypedConfig(any_from_message(
            FILE_ACCESS_LOG_TYPE_URL,
            &file_log,
        ))),
    }
}

/// Append the access log sinks the mesh enables to `tcp_proxy`
///
/// The file sink always precedes the gRPC sink.
pub fn attach_access_logs(mesh: &MeshConfig, grpc: &TcpGrpcAccessLog, tcp_proxy: &mut TcpProxy) {
    if !mesh.access_log_file.is_empty() {
        tcp_proxy.access_log.push(build_file_access_log(mesh));
    }

    if mesh.enable_envoy_access_log_service {
        tcp_proxy.access_log.push(grpc.access_log().clone());
    }
}

fn inline_text(text: String) -> DataSource {
    DataSource { specifier: Some(data_source::Specifier::InlineString(text)), ..Default::default() }
}

fn json_log_format(custom: &str) -> ProstStruct {
    if !custom.is_empty() {
        match serde_json::from_str::<serde_json::Value>(custom) {
            Ok(serde_json::Value::Object(fields)) => {
                return ProstStruct {
                    fields: fields.iter().map(|(k, v)| (k.clone(), json_to_prost_value(v))).collect(),
                };
            }
            Ok(_) => warn!("JSON access log format is not an object; using the default format"),
            Err(error) => {
                warn!(%error, "Failed to parse JSON access log format; using the default format")
            }
        }
    }

    ProstStruct {
        fields: DEFAULT_JSON_FORMAT
            .iter()
            .map(|(key, value)| {
                (key.to_string(), ProstValue { kind: Some(Kind::StringValue(value.to_string())) })
            })
            .collect(),
    }
}

fn json_to_prost_value(value: &serde_json::Value) -> ProstValue {
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(*b),
        serde_json::Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Kind::StringValue(s.clone()),
        serde_json::Value::Array(items) => {
            Kind::ListValue(ListValue { values: items.iter().map(json_to_prost_value).collect() })
        }
        serde_json::Value::Object(fields) => Kind::StructValue(ProstStruct {
            fields: fields.iter().map(|(k, v)| (k.clone(), json_to_prost_value(v))).collect(),
        }),
    };
    ProstValue { kind: Some(kind) }
}
