//! REST API handlers.
//!
//! Each handler delegates to the `Orchestrator` and returns JSON on
//! success. Failures are plain-text messages (see [`ApiError`]).

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

use edge_core::types::{InstanceId, LifecycleCommand, LifecycleState, Workload, WorkloadSpec};
use edgegrid_orchestrator::{
    CreateAssociationRequest, OrchestratorError, RegisterNodeRequest, RegisterWorkloadRequest,
};

use crate::ApiState;
use crate::error::ApiResult;

// ── Associations ───────────────────────────────────────────────

/// Query string of `GET /associations`.
#[derive(Debug, Default, Deserialize)]
pub struct AssociationFilter {
    pub node_id: Option<String>,
}

/// POST /associations
pub async fn create_association(
    State(state): State<ApiState>,
    payload: Result<Json<CreateAssociationRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let association = state.orchestrator.create_association(&req)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": association.id }))))
}

/// GET /associations?node_id=
pub async fn list_associations(
    State(state): State<ApiState>,
    filter: Result<Query<AssociationFilter>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(filter) = filter?;
    let associations = state
        .orchestrator
        .list_associations(filter.node_id.as_deref())?;
    Ok(Json(associations))
}

/// GET /associations/{id}
pub async fn get_association(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator.get_association(&id)?))
}

/// DELETE /associations/{id}
pub async fn delete_association(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.delete_association(&id)?;
    Ok(StatusCode::OK)
}

// ── Nodes ──────────────────────────────────────────────────────

/// POST /nodes
pub async fn register_node(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterNodeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let node = state.orchestrator.register_node(req)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": node.id }))))
}

/// GET /nodes
pub async fn list_nodes(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator.list_nodes()?))
}

/// GET /nodes/{node_id}
pub async fn get_node(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator.get_node(&id)?))
}

/// DELETE /nodes/{node_id}
pub async fn delete_node(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.delete_node(&id).await?;
    Ok(StatusCode::OK)
}

// ── Workloads ──────────────────────────────────────────────────

/// POST /workloads
pub async fn register_workload(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterWorkloadRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let workload = state.orchestrator.register_workload(req)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": workload.id }))))
}

/// GET /workloads
pub async fn list_workloads(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator.list_workloads()?))
}

/// GET /workloads/{id}
pub async fn get_workload(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.orchestrator.get_workload(&id)?))
}

/// DELETE /workloads/{id}
pub async fn delete_workload(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.delete_workload(&id)?;
    Ok(StatusCode::OK)
}

// ── Instances ──────────────────────────────────────────────────

/// Redeploy body. The instance id comes from the path; repeating it in the
/// body is allowed as long as it matches.
#[derive(Debug, Deserialize)]
pub struct InstanceDefinition {
    #[serde(default)]
    pub id: Option<InstanceId>,
    #[serde(flatten)]
    pub spec: WorkloadSpec,
}

/// PATCH body.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: LifecycleCommand,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct InstanceStatus {
    pub id: InstanceId,
    pub state: LifecycleState,
}

/// POST /nodes/{node_id}/instances
pub async fn deploy_instance(
    State(state): State<ApiState>,
    Path(node_id): Path<String>,
    payload: Result<Json<Workload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(workload) = payload?;
    state.orchestrator.deploy(&node_id, &workload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": workload.id }))))
}

/// PUT /nodes/{node_id}/instances/{id}
pub async fn redeploy_instance(
    State(state): State<ApiState>,
    Path((node_id, id)): Path<(String, String)>,
    payload: Result<Json<InstanceDefinition>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(definition) = payload?;
    if definition.id.as_ref().is_some_and(|body_id| *body_id != id) {
        return Err(OrchestratorError::validation("id in body does not match path").into());
    }
    let workload = Workload {
        id,
        spec: definition.spec,
    };
    state.orchestrator.redeploy(&node_id, &workload).await?;
    Ok(StatusCode::OK)
}

/// GET /nodes/{node_id}/instances/{id}
pub async fn get_instance(
    State(state): State<ApiState>,
    Path((node_id, id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let lifecycle = state.orchestrator.status(&node_id, &id).await?;
    Ok(Json(InstanceStatus {
        id,
        state: lifecycle,
    }))
}

/// PATCH /nodes/{node_id}/instances/{id}
pub async fn command_instance(
    State(state): State<ApiState>,
    Path((node_id, id)): Path<(String, String)>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    state
        .orchestrator
        .command(&node_id, &id, req.command)
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /nodes/{node_id}/instances/{id}
pub async fn undeploy_instance(
    State(state): State<ApiState>,
    Path((node_id, id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    state.orchestrator.undeploy(&node_id, &id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;
    use edge_core::types::WorkloadKind;
    use edgegrid_agent::LocalConnector;
    use edgegrid_orchestrator::Orchestrator;
    use edgegrid_state::StateStore;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn test_state() -> ApiState {
        let store = StateStore::open_in_memory().unwrap();
        ApiState {
            orchestrator: Arc::new(Orchestrator::new(store, Arc::new(LocalConnector::new()))),
        }
    }

    fn into_response(result: ApiResult<impl IntoResponse>) -> Response {
        match result {
            Ok(ok) => ok.into_response(),
            Err(err) => err.into_response(),
        }
    }

    fn node(state: &ApiState) -> String {
        state
            .orchestrator
            .register_node(RegisterNodeRequest {
                id: None,
                address: "127.0.0.1".to_string(),
                port: 50051,
                labels: HashMap::new(),
            })
            .unwrap()
            .id
    }

    fn spec() -> WorkloadSpec {
        WorkloadSpec {
            kind: WorkloadKind::Container,
            name: "web".to_string(),
            image: "nginx:1.25".to_string(),
            command: vec![],
        }
    }

    #[tokio::test]
    async fn list_associations_empty() {
        let state = test_state();
        let resp = into_response(
            list_associations(State(state), Ok(Query(AssociationFilter::default()))).await,
        );
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_nonexistent_association() {
        let state = test_state();
        let resp = into_response(get_association(State(state), Path("nope".to_string())).await);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_with_id_is_bad_request() {
        let state = test_state();
        let req = CreateAssociationRequest {
            id: Some("123".to_string()),
            ..Default::default()
        };
        let resp = into_response(create_association(State(state), Ok(Json(req))).await);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_node_is_created() {
        let state = test_state();
        let req = RegisterNodeRequest {
            id: None,
            address: "10.0.0.7".to_string(),
            port: 50051,
            labels: HashMap::new(),
        };
        let resp = into_response(register_node(State(state.clone()), Ok(Json(req))).await);
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(state.orchestrator.list_nodes().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn instance_handlers_follow_the_lifecycle() {
        let state = test_state();
        let node_id = node(&state);
        let path = || Path((node_id.clone(), "v1".to_string()));

        let workload = Workload {
            id: "v1".to_string(),
            spec: spec(),
        };
        let resp = into_response(
            deploy_instance(State(state.clone()), Path(node_id.clone()), Ok(Json(workload))).await,
        );
        assert_eq!(resp.status(), StatusCode::CREATED);

        let stop = CommandRequest {
            command: LifecycleCommand::Stop,
        };
        let resp = into_response(command_instance(State(state.clone()), path(), Ok(Json(stop))).await);
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let start = CommandRequest {
            command: LifecycleCommand::Start,
        };
        let resp = into_response(command_instance(State(state.clone()), path(), Ok(Json(start))).await);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            state.orchestrator.status(&node_id, "v1").await,
            Ok(LifecycleState::Running)
        );

        let resp = into_response(undeploy_instance(State(state.clone()), path()).await);
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = into_response(get_instance(State(state), path()).await);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn redeploy_rejects_mismatched_id() {
        let state = test_state();
        let node_id = node(&state);
        let definition = InstanceDefinition {
            id: Some("other".to_string()),
            spec: spec(),
        };
        let resp = into_response(
            redeploy_instance(
                State(state),
                Path((node_id, "v1".to_string())),
                Ok(Json(definition)),
            )
            .await,
        );
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_node_and_workload() {
        let state = test_state();
        let node_id = node(&state);
        let workload = state
            .orchestrator
            .register_workload(RegisterWorkloadRequest { id: None, spec: spec() })
            .unwrap();
        let association = state
            .orchestrator
            .create_association(&CreateAssociationRequest::new(&node_id, &workload.id))
            .unwrap();

        let resp = into_response(delete_node(State(state.clone()), Path(node_id.clone())).await);
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp =
            into_response(delete_workload(State(state.clone()), Path(workload.id.clone())).await);
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        state.orchestrator.delete_association(&association.id).unwrap();
        let resp = into_response(delete_node(State(state.clone()), Path(node_id.clone())).await);
        assert_eq!(resp.status(), StatusCode::OK);
        let resp =
            into_response(delete_workload(State(state.clone()), Path(workload.id.clone())).await);
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = into_response(delete_node(State(state.clone()), Path(node_id)).await);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = into_response(delete_workload(State(state), Path(workload.id)).await);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn register_node_rejects_unusable_address() {
        let state = test_state();
        let req = RegisterNodeRequest {
            id: None,
            address: "edge node 1".to_string(),
            port: 50051,
            labels: HashMap::new(),
        };
        let resp = into_response(register_node(State(state.clone()), Ok(Json(req))).await);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.orchestrator.list_nodes().unwrap().is_empty());
    }
}
