//! Request payloads accepted at the orchestration boundary.
//!
//! Fields the caller must not or need not send are optional here so that
//! validation, not deserialization, decides what is wrong with a request.

use std::collections::HashMap;

use serde::Deserialize;

use edge_core::id;
use edge_core::types::WorkloadSpec;
use edgegrid_agent::client::parse_endpoint;
use edgegrid_state::agent_endpoint;

use crate::error::{OrchestratorError, OrchestratorResult};

const ID_NOT_ALLOWED: &str = "id cannot be specified in POST request";

/// Body of a create-association call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAssociationRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub workload_id: Option<String>,
}

impl CreateAssociationRequest {
    pub fn new(node_id: impl Into<String>, workload_id: impl Into<String>) -> Self {
        Self {
            id: None,
            node_id: Some(node_id.into()),
            workload_id: Some(workload_id.into()),
        }
    }

    /// Check the request, returning the `(node_id, workload_id)` pair.
    ///
    /// Checks run in a fixed order and the first failure wins.
    pub fn validate(&self) -> OrchestratorResult<(&str, &str)> {
        if self.id.is_some() {
            return Err(OrchestratorError::validation(ID_NOT_ALLOWED));
        }
        let node_id = self
            .node_id
            .as_deref()
            .filter(|s| id::is_valid(s))
            .ok_or_else(|| OrchestratorError::validation("node_id not a valid uuid"))?;
        let workload_id = self
            .workload_id
            .as_deref()
            .filter(|s| id::is_valid(s))
            .ok_or_else(|| OrchestratorError::validation("workload_id not a valid uuid"))?;
        Ok((node_id, workload_id))
    }
}

/// Body of a node registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterNodeRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl RegisterNodeRequest {
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.id.is_some() {
            return Err(OrchestratorError::validation(ID_NOT_ALLOWED));
        }
        if self.address.trim().is_empty() {
            return Err(OrchestratorError::validation("address cannot be empty"));
        }
        if self.port == 0 {
            return Err(OrchestratorError::validation("port must be non-zero"));
        }
        // The address must be the whole authority, not spill into a path.
        let endpoint = parse_endpoint(&agent_endpoint(&self.address, self.port));
        if !endpoint.is_ok_and(|e| e.uri().path() == "/" && e.uri().port_u16() == Some(self.port)) {
            return Err(OrchestratorError::validation(format!(
                "address {:?} is not a valid host",
                self.address
            )));
        }
        Ok(())
    }
}

/// Body of a workload registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterWorkloadRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub spec: WorkloadSpec,
}

impl RegisterWorkloadRequest {
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.id.is_some() {
            return Err(OrchestratorError::validation(ID_NOT_ALLOWED));
        }
        if self.spec.name.trim().is_empty() {
            return Err(OrchestratorError::validation("name cannot be empty"));
        }
        if self.spec.image.trim().is_empty() {
            return Err(OrchestratorError::validation("image cannot be empty"));
        }
        Ok(())
    }
}
