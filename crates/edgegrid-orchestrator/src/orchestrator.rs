//! Orchestrator: the control plane's request surface.
//!
//! The `Orchestrator` validates requests, keeps the association registry
//! in the state store, and forwards instance lifecycle commands to the
//! agent on the target node:
//! - Association, node and workload records live only in the store
//! - Instance state lives only on the agents; nothing is cached here
//! - Calls against one instance on one node are serialized; everything
//!   else runs concurrently

use std::sync::Arc;

use tracing::{debug, info};

use edge_core::id;
use edge_core::types::{LifecycleCommand, LifecycleState, Workload};
use edgegrid_agent::{AgentClient, AgentConnector};
use edgegrid_state::{Association, Node, StateStore};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::locks::InstanceLocks;
use crate::request::{CreateAssociationRequest, RegisterNodeRequest, RegisterWorkloadRequest};

/// The orchestration service.
pub struct Orchestrator {
    store: StateStore,
    connector: Arc<dyn AgentConnector>,
    locks: InstanceLocks,
}

impl Orchestrator {
    pub fn new(store: StateStore, connector: Arc<dyn AgentConnector>) -> Self {
        Self {
            store,
            connector,
            locks: InstanceLocks::default(),
        }
    }

    // ── Associations ───────────────────────────────────────────────

    /// Assign a workload to a node, returning the stored record.
    pub fn create_association(
        &self,
        request: &CreateAssociationRequest,
    ) -> OrchestratorResult<Association> {
        let (node_id, workload_id) = request.validate()?;
        let association = self.store.create_association(node_id, workload_id)?;
        info!(
            association_id = %association.id,
            %node_id,
            %workload_id,
            "association created"
        );
        Ok(association)
    }

    pub fn get_association(&self, association_id: &str) -> OrchestratorResult<Association> {
        Ok(self.store.get_association(association_id)?)
    }

    /// Associations in creation order, optionally only those of one node.
    pub fn list_associations(&self, node_id: Option<&str>) -> OrchestratorResult<Vec<Association>> {
        Ok(self.store.list_associations(node_id)?)
    }

    /// Remove an association. Instances on the node are left alone.
    pub fn delete_association(&self, association_id: &str) -> OrchestratorResult<()> {
        self.store.delete_association(association_id)?;
        info!(%association_id, "association deleted");
        Ok(())
    }

    // ── Nodes & workloads ──────────────────────────────────────────

    pub fn register_node(&self, request: RegisterNodeRequest) -> OrchestratorResult<Node> {
        request.validate()?;
        let node = Node {
            id: id::new_id(),
            address: request.address,
            port: request.port,
            labels: request.labels,
        };
        self.store.put_node(&node)?;
        info!(node_id = %node.id, endpoint = %node.agent_endpoint(), "node registered");
        Ok(node)
    }

    pub fn get_node(&self, node_id: &str) -> OrchestratorResult<Node> {
        self.store
            .get_node(node_id)?
            .ok_or_else(|| OrchestratorError::NotFound(format!("node {node_id} not found")))
    }

    pub fn list_nodes(&self) -> OrchestratorResult<Vec<Node>> {
        Ok(self.store.list_nodes()?)
    }

    /// Unregister a node that no association names, dropping its agent client.
    pub async fn delete_node(&self, node_id: &str) -> OrchestratorResult<()> {
        if !self.store.delete_node(node_id)? {
            return Err(OrchestratorError::NotFound(format!("node {node_id} not found")));
        }
        self.connector.forget(node_id).await;
        info!(%node_id, "node deleted");
        Ok(())
    }

    pub fn register_workload(
        &self,
        request: RegisterWorkloadRequest,
    ) -> OrchestratorResult<Workload> {
        request.validate()?;
        let workload = Workload {
            id: id::new_id(),
            spec: request.spec,
        };
        self.store.put_workload(&workload)?;
        info!(workload_id = %workload.id, kind = %workload.spec.kind, "workload registered");
        Ok(workload)
    }

    pub fn get_workload(&self, workload_id: &str) -> OrchestratorResult<Workload> {
        self.store.get_workload(workload_id)?.ok_or_else(|| {
            OrchestratorError::NotFound(format!("workload {workload_id} not found"))
        })
    }

    pub fn list_workloads(&self) -> OrchestratorResult<Vec<Workload>> {
        Ok(self.store.list_workloads()?)
    }

    /// Unregister a workload that no association names.
    pub fn delete_workload(&self, workload_id: &str) -> OrchestratorResult<()> {
        if !self.store.delete_workload(workload_id)? {
            return Err(OrchestratorError::NotFound(format!(
                "workload {workload_id} not found"
            )));
        }
        info!(%workload_id, "workload deleted");
        Ok(())
    }

    // ── Instances ──────────────────────────────────────────────────

    /// Deploy `workload` on a node; `workload.id` names the new instance.
    pub async fn deploy(&self, node_id: &str, workload: &Workload) -> OrchestratorResult<()> {
        let agent = self.agent(node_id).await?;
        let _guard = self.locks.lock(node_id, &workload.id).await;
        agent.deploy(workload).await?;
        info!(%node_id, instance_id = %workload.id, "instance deployed");
        Ok(())
    }

    /// Replace the definition of an instance, keeping its state.
    pub async fn redeploy(&self, node_id: &str, workload: &Workload) -> OrchestratorResult<()> {
        let agent = self.agent(node_id).await?;
        let _guard = self.locks.lock(node_id, &workload.id).await;
        agent.redeploy(workload).await?;
        info!(%node_id, instance_id = %workload.id, "instance redeployed");
        Ok(())
    }

    pub async fn start(&self, node_id: &str, instance_id: &str) -> OrchestratorResult<()> {
        self.command(node_id, instance_id, LifecycleCommand::Start)
            .await
    }

    pub async fn stop(&self, node_id: &str, instance_id: &str) -> OrchestratorResult<()> {
        self.command(node_id, instance_id, LifecycleCommand::Stop)
            .await
    }

    pub async fn restart(&self, node_id: &str, instance_id: &str) -> OrchestratorResult<()> {
        self.command(node_id, instance_id, LifecycleCommand::Restart)
            .await
    }

    /// Apply a start, stop or restart to an instance.
    pub async fn command(
        &self,
        node_id: &str,
        instance_id: &str,
        command: LifecycleCommand,
    ) -> OrchestratorResult<()> {
        let agent = self.agent(node_id).await?;
        let _guard = self.locks.lock(node_id, instance_id).await;
        agent.command(instance_id, command).await?;
        info!(%node_id, %instance_id, %command, "lifecycle command applied");
        Ok(())
    }

    pub async fn undeploy(&self, node_id: &str, instance_id: &str) -> OrchestratorResult<()> {
        let agent = self.agent(node_id).await?;
        let _guard = self.locks.lock(node_id, instance_id).await;
        agent.undeploy(instance_id).await?;
        info!(%node_id, %instance_id, "instance undeployed");
        Ok(())
    }

    /// Current state of an instance, as reported by its agent.
    pub async fn status(
        &self,
        node_id: &str,
        instance_id: &str,
    ) -> OrchestratorResult<LifecycleState> {
        let agent = self.agent(node_id).await?;
        let _guard = self.locks.lock(node_id, instance_id).await;
        Ok(agent.status(instance_id).await?)
    }

    async fn agent(&self, node_id: &str) -> OrchestratorResult<Arc<dyn AgentClient>> {
        let node = self.get_node(node_id)?;
        debug!(%node_id, endpoint = %node.agent_endpoint(), "resolving node agent");
        Ok(self.connector.connect(&node).await?)
    }
}
