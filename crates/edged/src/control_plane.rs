//! Control plane mode: the REST API over the orchestration service.
//!
//! In this mode, the daemon:
//! 1. Opens the redb state store under the data directory
//! 2. Builds a gRPC connector with the configured timeouts
//! 3. Serves the REST API until Ctrl-C

use std::sync::Arc;

use tracing::info;

use edge_core::config::ControlPlaneConfig;
use edgegrid_agent::{ClientOptions, GrpcConnector};
use edgegrid_orchestrator::Orchestrator;
use edgegrid_state::StateStore;

/// Run the control plane.
pub async fn run_control_plane(config: ControlPlaneConfig) -> anyhow::Result<()> {
    info!("EdgeGrid daemon starting in control-plane mode");

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.data_dir.join("edgegrid.redb");
    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let options = ClientOptions::from(&config);
    let connector = Arc::new(GrpcConnector::new(options));
    info!(
        rpc_timeout_ms = config.rpc_timeout_ms,
        connect_timeout_ms = config.connect_timeout_ms,
        "agent connector initialized"
    );

    let orchestrator = Arc::new(Orchestrator::new(store, connector));
    let router = edgegrid_api::build_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(&config.api_addr).await?;
    info!(addr = %listener.local_addr()?, "API server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(crate::shutdown_signal())
        .await?;

    info!("control plane stopped");
    Ok(())
}
