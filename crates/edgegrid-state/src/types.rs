//! Domain types for the EdgeGrid state store.
//!
//! All types are serializable to/from JSON for storage in redb tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv6Addr;

pub use edge_core::types::{
    AssociationId, NodeId, Workload, WorkloadId, WorkloadKind, WorkloadSpec,
};

// ── Node ──────────────────────────────────────────────────────────

/// A registered edge node and how to reach its agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Host or IP of the node agent's gRPC endpoint.
    pub address: String,
    pub port: u16,
    /// Free-form labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Node {
    /// URI of the node agent's gRPC endpoint.
    pub fn agent_endpoint(&self) -> String {
        agent_endpoint(&self.address, self.port)
    }
}

/// URI of the agent at `address:port`. IPv6 literals get brackets.
pub fn agent_endpoint(address: &str, port: u16) -> String {
    match address.parse::<Ipv6Addr>() {
        Ok(ip) => format!("http://[{ip}]:{port}"),
        Err(_) => format!("http://{address}:{port}"),
    }
}

// ── Association ───────────────────────────────────────────────────

/// Declarative assignment of one workload to one node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Association {
    pub id: AssociationId,
    pub node_id: NodeId,
    pub workload_id: WorkloadId,
}

impl Association {
    /// Build the key for the pair-uniqueness index.
    pub fn pair_key(&self) -> String {
        pair_key(&self.node_id, &self.workload_id)
    }
}

pub(crate) fn pair_key(node_id: &str, workload_id: &str) -> String {
    format!("{node_id}/{workload_id}")
}
