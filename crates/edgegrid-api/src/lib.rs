//! edgegrid-api: REST API for EdgeGrid.
//!
//! Provides axum route handlers over the [`Orchestrator`]. Success bodies
//! are JSON; error bodies are the plain-text error message.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/associations` | Assign a workload to a node |
//! | GET | `/associations?node_id=` | List associations in creation order |
//! | GET | `/associations/{id}` | Get an association |
//! | DELETE | `/associations/{id}` | Delete an association |
//! | POST | `/nodes` | Register a node |
//! | GET | `/nodes`, `/nodes/{node_id}` | List or get nodes |
//! | DELETE | `/nodes/{node_id}` | Unregister a node without associations |
//! | POST | `/workloads` | Register a workload |
//! | GET | `/workloads`, `/workloads/{id}` | List or get workloads |
//! | DELETE | `/workloads/{id}` | Unregister a workload without associations |
//! | POST | `/nodes/{node_id}/instances` | Deploy an instance |
//! | PUT | `/nodes/{node_id}/instances/{id}` | Redeploy an instance |
//! | GET | `/nodes/{node_id}/instances/{id}` | Instance state |
//! | PATCH | `/nodes/{node_id}/instances/{id}` | Start, stop or restart |
//! | DELETE | `/nodes/{node_id}/instances/{id}` | Undeploy an instance |

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use edgegrid_orchestrator::Orchestrator;

pub use error::{ApiError, ApiResult};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the complete API router.
pub fn build_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route(
            "/associations",
            get(handlers::list_associations).post(handlers::create_association),
        )
        .route(
            "/associations/{id}",
            get(handlers::get_association).delete(handlers::delete_association),
        )
        .route("/nodes", get(handlers::list_nodes).post(handlers::register_node))
        .route(
            "/nodes/{node_id}",
            get(handlers::get_node).delete(handlers::delete_node),
        )
        .route("/nodes/{node_id}/instances", post(handlers::deploy_instance))
        .route(
            "/nodes/{node_id}/instances/{id}",
            get(handlers::get_instance)
                .put(handlers::redeploy_instance)
                .patch(handlers::command_instance)
                .delete(handlers::undeploy_instance),
        )
        .route(
            "/workloads",
            get(handlers::list_workloads).post(handlers::register_workload),
        )
        .route(
            "/workloads/{id}",
            get(handlers::get_workload).delete(handlers::delete_workload),
        )
        .with_state(state)
}
