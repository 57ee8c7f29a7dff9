use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::WaypointConfig;
use waypoint_a2a::{AgentState, HttpConnector, RoutingAgent, Task};
use waypoint_core::MockRunner;
use waypoint_gateway::GatewayServer;
use waypoint_gateway::assets::resolve_static_dir;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(version)]
#[command(about = "Route chat requests to remote A2A agents")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Start {
        /// Address to listen on, overrides the config file
        #[arg(long)]
        bind: Option<String>,

        /// Directory of static UI files, overrides the config file
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Resolve the configured agents and print their cards
    Agents,

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Start { bind, static_dir } => cmd_start(&cli.config, bind, static_dir).await,
        Commands::Agents => cmd_agents(&cli.config).await,
        Commands::Config => cmd_config(&cli.config),
    }
}

/// Load the config file, or fall back to the agent environment variables
fn load_config(config_path: &Option<PathBuf>) -> WaypointConfig {
    match WaypointConfig::load(config_path) {
        Ok(cfg) => {
            info!("Loaded {} agents from config", cfg.agents.len());
            cfg
        }
        Err(e) => {
            warn!(
                "Failed to load config, falling back to environment variables: {:#}",
                e
            );
            WaypointConfig::from_env()
        }
    }
}

async fn connect_agents(cfg: &WaypointConfig) -> Result<RoutingAgent> {
    let connector = HttpConnector::new(Duration::from_secs(cfg.routing.timeout_secs))?;
    Ok(RoutingAgent::connect(&cfg.agent_urls(), &connector).await)
}

async fn cmd_start(
    config_path: &Option<PathBuf>,
    bind: Option<String>,
    static_dir: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config(config_path);

    let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let bind: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;

    let routing = connect_agents(&cfg).await?.with_task_callback(Arc::new(
        |task_id: &str, task: &Task| {
            let state = task
                .status
                .as_ref()
                .map(|s| s.state.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            info!("Remote task {} is {}", task_id, state);
        },
    ));
    info!("{} remote agents ready", routing.registry().len());
    debug!("{}", routing.root_instruction(&AgentState::new()));

    let static_dir = static_dir.or_else(|| cfg.server.static_dir.as_ref().map(PathBuf::from));
    let static_dir = resolve_static_dir(static_dir.as_deref());

    let server = GatewayServer::new(bind, Arc::new(routing), Arc::new(MockRunner::new()))
        .with_static_dir(static_dir);

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            token.cancel();
        }
    });

    server.run(shutdown).await
}

async fn cmd_agents(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config_path);
    let routing = connect_agents(&cfg).await?;

    if routing.registry().is_empty() {
        println!("No remote agents reachable.");
        return Ok(());
    }

    for name in routing.registry().names() {
        if let Some(conn) = routing.registry().get(&name) {
            println!("{}  {}  ({})", conn.card.name, conn.card.description, conn.address);
        }
    }
    Ok(())
}

fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config_path);
    let rendered = toml::to_string_pretty(&cfg).context("Failed to render config")?;
    println!("{}", rendered);
    Ok(())
}
