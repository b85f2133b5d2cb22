//! Resolving nodes to agent clients.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use edgegrid_lifecycle::InstanceTable;
use edgegrid_state::{Node, NodeId};

use crate::client::{AgentClient, ClientOptions, GrpcAgentClient};
use crate::error::AgentResult;
use crate::local::LocalAgent;

/// Hands out the agent client for a node.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    async fn connect(&self, node: &Node) -> AgentResult<Arc<dyn AgentClient>>;

    /// Drop whatever is held for a node that is no longer registered.
    async fn forget(&self, _node_id: &str) {}
}

/// Connector dialing each node's agent over gRPC.
///
/// Keeps one lazily connected client per node, so every node gets its own
/// channel. A node whose endpoint changed gets a fresh client.
pub struct GrpcConnector {
    options: ClientOptions,
    clients: RwLock<HashMap<NodeId, Arc<GrpcAgentClient>>>,
}

impl GrpcConnector {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            clients: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AgentConnector for GrpcConnector {
    async fn connect(&self, node: &Node) -> AgentResult<Arc<dyn AgentClient>> {
        let endpoint = node.agent_endpoint();

        let cached = |clients: &HashMap<NodeId, Arc<GrpcAgentClient>>| {
            clients
                .get(&node.id)
                .filter(|client| client.endpoint() == endpoint)
                .cloned()
        };

        if let Some(client) = cached(&*self.clients.read().await) {
            return Ok(client);
        }

        let mut clients = self.clients.write().await;
        if let Some(client) = cached(&clients) {
            return Ok(client);
        }

        let client = Arc::new(GrpcAgentClient::connect_lazy(&endpoint, &self.options)?);
        debug!(node_id = %node.id, %endpoint, "agent client cached");
        clients.insert(node.id.clone(), client.clone());
        Ok(client)
    }

    async fn forget(&self, node_id: &str) {
        if self.clients.write().await.remove(node_id).is_some() {
            debug!(%node_id, "agent client evicted");
        }
    }
}

/// Connector backed by in-process instance tables, one per node.
#[derive(Default)]
pub struct LocalConnector {
    agents: RwLock<HashMap<NodeId, LocalAgent>>,
}

impl LocalConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `node_id` from the given table.
    pub async fn insert(&self, node_id: impl Into<NodeId>, table: Arc<InstanceTable>) {
        self.agents
            .write()
            .await
            .insert(node_id.into(), LocalAgent::new(table));
    }

    /// The table behind `node_id`, created on first use.
    pub async fn table(&self, node_id: &str) -> Arc<InstanceTable> {
        self.agent(node_id).await.table().clone()
    }

    async fn agent(&self, node_id: &str) -> LocalAgent {
        if let Some(agent) = self.agents.read().await.get(node_id) {
            return agent.clone();
        }
        self.agents
            .write()
            .await
            .entry(node_id.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl AgentConnector for LocalConnector {
    async fn connect(&self, node: &Node) -> AgentResult<Arc<dyn AgentClient>> {
        Ok(Arc::new(self.agent(&node.id).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_core::types::LifecycleState;

    fn node(id: &str, port: u16) -> Node {
        Node {
            id: id.to_string(),
            address: "127.0.0.1".to_string(),
            port,
            labels: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn grpc_clients_are_cached_per_endpoint() {
        let connector = GrpcConnector::new(ClientOptions::default());

        connector.connect(&node("n1", 50051)).await.unwrap();
        connector.connect(&node("n1", 50051)).await.unwrap();
        connector.connect(&node("n2", 50051)).await.unwrap();
        assert_eq!(connector.clients.read().await.len(), 2);

        connector.connect(&node("n1", 50052)).await.unwrap();
        let endpoint = connector.clients.read().await["n1"].endpoint().to_string();
        assert_eq!(endpoint, "http://127.0.0.1:50052");

        connector.forget("n1").await;
        assert_eq!(connector.clients.read().await.len(), 1);
    }

    #[tokio::test]
    async fn ipv6_nodes_connect() {
        let connector = GrpcConnector::new(ClientOptions::default());
        let node = Node {
            address: "::1".to_string(),
            ..node("n1", 50051)
        };

        connector.connect(&node).await.unwrap();
        let endpoint = connector.clients.read().await["n1"].endpoint().to_string();
        assert_eq!(endpoint, "http://[::1]:50051");
    }

    #[tokio::test]
    async fn local_nodes_have_separate_tables() {
        let connector = LocalConnector::new();
        let shared = Arc::new(InstanceTable::new());
        connector.insert("n1", shared.clone()).await;

        let n1 = connector.connect(&node("n1", 0)).await.unwrap();
        let n2 = connector.connect(&node("n2", 0)).await.unwrap();

        let workload = edge_core::types::Workload {
            id: "v1".to_string(),
            spec: edge_core::types::WorkloadSpec {
                kind: edge_core::types::WorkloadKind::Vnf,
                name: "upf".to_string(),
                image: "upf:1".to_string(),
                command: vec![],
            },
        };
        n1.deploy(&workload).await.unwrap();

        assert_eq!(shared.status("v1").await, Ok(LifecycleState::Ready));
        assert!(n2.status("v1").await.is_err());
        assert!(connector.table("n2").await.is_empty().await);
    }
}
