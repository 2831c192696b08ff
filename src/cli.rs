//! # Command Line Interface
//!
//! `meshplane render` reads a listener scenario from YAML, renders its network
//! filter chain with the current feature flags and prints the result as JSON.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{FeatureFlags, LoggingConfig, MeshConfig};
use crate::errors::Result;
use crate::observability::init_logging;
use crate::xds::{
    ConfigMeta, FilterView, ListenerProtocol, NetworkFilterBuilder, Port, Proxy, PushContext,
    RouteDestination, Service, ServiceInstance, TrafficDirection,
};

#[derive(Parser)]
#[command(name = "meshplane")]
#[command(about = "Meshplane network filter chain tooling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the network filter chain for a listener scenario
    Render {
        /// Scenario file (YAML)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Mesh config file (YAML); defaults apply when omitted
        #[arg(short, long)]
        mesh: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Listener to render, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListenerScenario {
    Inbound {
        instance: ServiceInstance,
    },
    Outbound {
        port: Port,
        routes: Vec<RouteDestination>,
        #[serde(default)]
        config: ConfigMeta,
    },
    Passthrough {
        port: Port,
    },
}

impl ListenerScenario {
    pub fn direction(&self) -> TrafficDirection {
        match self {
            Self::Inbound { .. } => TrafficDirection::Inbound,
            Self::Outbound { .. } | Self::Passthrough { .. } => TrafficDirection::Outbound,
        }
    }

    fn port(&self) -> &Port {
        match self {
            Self::Inbound { instance } => &instance.service_port,
            Self::Outbound { port, .. } | Self::Passthrough { port } => port,
        }
    }
}

/// A proxy, the services it can see, and one listener to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub node: Proxy,
    #[serde(default)]
    pub services: Vec<Service>,
    pub listener: ListenerScenario,
}

impl Scenario {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Rendered listener: transport protocol plus its ordered filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub node_id: String,
    pub direction: TrafficDirection,
    pub listener_protocol: ListenerProtocol,
    pub filters: Vec<FilterView>,
}

/// Render `scenario` against `mesh` and `features`
pub fn render(scenario: Scenario, mesh: MeshConfig, features: FeatureFlags) -> Result<RenderOutput> {
    let ctx = PushContext::new(mesh, features)?.with_services(scenario.services);
    let builder = NetworkFilterBuilder::new(&ctx, &scenario.node);
    let listener = &scenario.listener;
    let direction = listener.direction();

    let filters = match listener {
        ListenerScenario::Inbound { instance } => builder.inbound(instance),
        ListenerScenario::Outbound { port, routes, config } => {
            builder.outbound(routes, port, config)?
        }
        ListenerScenario::Passthrough { port } => builder.gateway_auto_passthrough(port),
    };

    Ok(RenderOutput {
        node_id: scenario.node.id.clone(),
        direction,
        listener_protocol: builder.listener_protocol(listener.port(), direction),
        filters: filters.iter().map(FilterView::from).collect(),
    })
}

/// Parse arguments and run the selected command
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&logging)?;

    match cli.command {
        Commands::Render { scenario, mesh, pretty } => {
            let mesh = match mesh {
                Some(path) => MeshConfig::from_yaml_file(path)?,
                None => MeshConfig::default(),
            };
            let features = FeatureFlags::from_env();
            info!(scenario = %scenario.display(), "Rendering listener scenario");

            let output = render(Scenario::from_yaml_file(&scenario)?, mesh, features)?;
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
