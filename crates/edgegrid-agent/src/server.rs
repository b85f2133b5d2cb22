//! Node agent gRPC server.
//!
//! Implements the `NodeAgent` service over an [`InstanceTable`]. Lifecycle
//! rule violations are returned as status codes carrying the table's
//! message, which the client maps back one-to-one.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use edge_core::types::{LifecycleCommand, Workload};
use edgegrid_lifecycle::{InstanceTable, LifecycleError};

use crate::error::lifecycle_status;
use crate::proto;
use crate::proto::node_agent_server::{NodeAgent, NodeAgentServer};

/// gRPC implementation of the node agent service.
pub struct AgentServer {
    table: Arc<InstanceTable>,
}

impl AgentServer {
    pub fn new(table: Arc<InstanceTable>) -> Self {
        Self { table }
    }

    /// Get the tonic service for mounting on a gRPC server.
    pub fn into_service(self) -> NodeAgentServer<Self> {
        NodeAgentServer::new(self)
    }

    async fn command(
        &self,
        request: Request<proto::LifecycleCommand>,
        command: LifecycleCommand,
    ) -> Result<Response<proto::Ack>, Status> {
        let id = request.into_inner().id;
        self.table
            .apply(&id, command)
            .await
            .map_err(|e| reject(&id, e))?;
        Ok(Response::new(proto::Ack {}))
    }
}

fn decode_workload(msg: proto::Workload) -> Result<Workload, Status> {
    Workload::try_from(msg).map_err(|e| Status::invalid_argument(e.to_string()))
}

fn reject(id: &str, err: LifecycleError) -> Status {
    debug!(instance_id = %id, error = %err, "lifecycle request rejected");
    lifecycle_status(err)
}

#[tonic::async_trait]
impl NodeAgent for AgentServer {
    async fn deploy(
        &self,
        request: Request<proto::Workload>,
    ) -> Result<Response<proto::Ack>, Status> {
        let workload = decode_workload(request.into_inner())?;
        let id = workload.id.clone();
        self.table
            .deploy(workload)
            .await
            .map_err(|e| reject(&id, e))?;
        Ok(Response::new(proto::Ack {}))
    }

    async fn redeploy(
        &self,
        request: Request<proto::Workload>,
    ) -> Result<Response<proto::Ack>, Status> {
        let workload = decode_workload(request.into_inner())?;
        let id = workload.id.clone();
        self.table
            .redeploy(workload)
            .await
            .map_err(|e| reject(&id, e))?;
        Ok(Response::new(proto::Ack {}))
    }

    async fn get_status(
        &self,
        request: Request<proto::InstanceRef>,
    ) -> Result<Response<proto::LifecycleStatus>, Status> {
        let id = request.into_inner().id;
        let state = self
            .table
            .status(&id)
            .await
            .map_err(|e| reject(&id, e))?;
        Ok(Response::new(state.into()))
    }

    async fn start(
        &self,
        request: Request<proto::LifecycleCommand>,
    ) -> Result<Response<proto::Ack>, Status> {
        self.command(request, LifecycleCommand::Start).await
    }

    async fn stop(
        &self,
        request: Request<proto::LifecycleCommand>,
    ) -> Result<Response<proto::Ack>, Status> {
        self.command(request, LifecycleCommand::Stop).await
    }

    async fn restart(
        &self,
        request: Request<proto::LifecycleCommand>,
    ) -> Result<Response<proto::Ack>, Status> {
        self.command(request, LifecycleCommand::Restart).await
    }

    async fn undeploy(
        &self,
        request: Request<proto::InstanceRef>,
    ) -> Result<Response<proto::Ack>, Status> {
        let id = request.into_inner().id;
        self.table
            .undeploy(&id)
            .await
            .map_err(|e| reject(&id, e))?;
        Ok(Response::new(proto::Ack {}))
    }
}
