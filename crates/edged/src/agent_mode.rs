//! Agent mode: runs on edge nodes and hosts workload instances.
//!
//! The agent keeps its instance table in memory; a restart forgets every
//! instance.

use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use edge_core::config::AgentConfig;
use edgegrid_agent::AgentServer;
use edgegrid_lifecycle::InstanceTable;

/// Run the node agent.
pub async fn run_agent(config: AgentConfig) -> anyhow::Result<()> {
    info!("EdgeGrid daemon starting in agent mode");

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address {}: {e}", config.listen_addr))?;

    let table = Arc::new(InstanceTable::new());
    let service = AgentServer::new(table).into_service();

    info!(%addr, "node agent gRPC server starting");
    Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, crate::shutdown_signal())
        .await?;

    info!("agent stopped");
    Ok(())
}
