//! edged: the EdgeGrid daemon.
//!
//! One binary, two roles:
//! - `control-plane`: association store (redb), orchestration service and
//!   the REST API
//! - `agent`: the node agent gRPC service over an in-memory instance table
//!
//! # Usage
//!
//! ```text
//! edged control-plane --config /etc/edgegrid/edged.toml
//! edged agent --listen-addr 0.0.0.0:50051
//! edged print-config
//! ```

mod agent_mode;
mod control_plane;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use edge_core::EdgeConfig;

const DEFAULT_LOG_FILTER: &str = "info,edged=debug,edgegrid=debug";

#[derive(Parser)]
#[command(name = "edged", about = "EdgeGrid daemon")]
struct Cli {
    /// Path to edged.toml. Flags override values read from it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control plane (REST API, association store, orchestration).
    ControlPlane {
        /// Address the REST API listens on.
        #[arg(long)]
        api_addr: Option<String>,

        /// Data directory for persistent state.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Deadline for each call to a node agent, in milliseconds.
        #[arg(long)]
        rpc_timeout_ms: Option<u64>,

        /// Connect timeout for node agent channels, in milliseconds.
        #[arg(long)]
        connect_timeout_ms: Option<u64>,
    },

    /// Run a node agent.
    Agent {
        /// Address the gRPC service listens on.
        #[arg(long)]
        listen_addr: Option<String>,
    },

    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = EdgeConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.config {
        info!(path = ?path, "configuration loaded");
    }

    match cli.command {
        Command::ControlPlane {
            api_addr,
            data_dir,
            rpc_timeout_ms,
            connect_timeout_ms,
        } => {
            let cp = &mut config.control_plane;
            if let Some(v) = api_addr {
                cp.api_addr = v;
            }
            if let Some(v) = data_dir {
                cp.data_dir = v;
            }
            if let Some(v) = rpc_timeout_ms {
                cp.rpc_timeout_ms = v;
            }
            if let Some(v) = connect_timeout_ms {
                cp.connect_timeout_ms = v;
            }
            control_plane::run_control_plane(config.control_plane).await
        }
        Command::Agent { listen_addr } => {
            if let Some(v) = listen_addr {
                config.agent.listen_addr = v;
            }
            agent_mode::run_agent(config.agent).await
        }
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install CTRL+C handler");
        return;
    }
    info!("shutdown signal received");
}
