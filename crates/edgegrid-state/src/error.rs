//! Error types for the EdgeGrid state store.

use thiserror::Error;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    /// A referenced record does not exist. The message names it.
    #[error("{0}")]
    NotFound(String),

    /// The record is still referenced by an association.
    #[error("{0}")]
    InUse(String),

    /// The `(node_id, workload_id)` pair already has a live association.
    #[error("duplicate record detected for node_id {node_id} and workload_id {workload_id}")]
    Duplicate { node_id: String, workload_id: String },
}

impl StateError {
    pub(crate) fn node_not_found(id: &str) -> Self {
        StateError::NotFound(format!("node {id} not found"))
    }

    pub(crate) fn workload_not_found(id: &str) -> Self {
        StateError::NotFound(format!("workload {id} not found"))
    }

    pub(crate) fn association_not_found(id: &str) -> Self {
        StateError::NotFound(format!("association {id} not found"))
    }
}
