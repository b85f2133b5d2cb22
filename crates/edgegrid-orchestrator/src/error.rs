//! Orchestration error types.

use thiserror::Error;

use edgegrid_agent::AgentError;
use edgegrid_state::StateError;

/// Result type alias for orchestration operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Every failure the orchestration service reports. Each variant carries
/// the human-readable message; only `Validation` adds a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl OrchestratorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        OrchestratorError::Validation(msg.into())
    }
}

impl From<StateError> for OrchestratorError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NotFound(msg) => OrchestratorError::NotFound(msg),
            dup @ StateError::Duplicate { .. } => OrchestratorError::Conflict(dup.to_string()),
            StateError::InUse(msg) => OrchestratorError::FailedPrecondition(msg),
            other => OrchestratorError::Internal(other.to_string()),
        }
    }
}

impl From<AgentError> for OrchestratorError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::NotFound(msg) => OrchestratorError::NotFound(msg),
            AgentError::FailedPrecondition(msg) => OrchestratorError::FailedPrecondition(msg),
            AgentError::Conflict(msg) => OrchestratorError::Conflict(msg),
            AgentError::InvalidArgument(msg) => OrchestratorError::Validation(msg),
            e @ AgentError::Unavailable(_) => OrchestratorError::Unavailable(e.to_string()),
            e @ AgentError::Internal(_) => OrchestratorError::Internal(e.to_string()),
        }
    }
}
