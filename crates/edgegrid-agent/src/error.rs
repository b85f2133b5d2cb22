//! Node agent client error taxonomy.

use thiserror::Error;
use tonic::{Code, Status};
use tracing::debug;

use edgegrid_lifecycle::LifecycleError;

pub type AgentResult<T> = Result<T, AgentError>;

/// Failure of a call to a node agent.
///
/// The first four variants are lifecycle rule violations reported by the
/// agent and carry its message verbatim. `Unavailable` is the only class
/// the client introduces itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("node agent unavailable: {0}")]
    Unavailable(String),

    #[error("node agent error: {0}")]
    Internal(String),
}

impl From<LifecycleError> for AgentError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(msg) => AgentError::NotFound(msg),
            LifecycleError::Conflict(msg) => AgentError::Conflict(msg),
            LifecycleError::FailedPrecondition(msg) => AgentError::FailedPrecondition(msg),
            LifecycleError::InvalidArgument(msg) => AgentError::InvalidArgument(msg),
        }
    }
}

/// Messages tonic attaches to statuses it synthesizes for non-gRPC replies.
const NOT_GRPC_PREFIXES: [&str; 2] = ["grpc-status header missing", "protocol error"];

impl From<Status> for AgentError {
    fn from(status: Status) -> Self {
        let msg = status.message().to_string();
        match status.code() {
            Code::NotFound => AgentError::NotFound(msg),
            Code::FailedPrecondition => AgentError::FailedPrecondition(msg),
            Code::AlreadyExists => AgentError::Conflict(msg),
            Code::InvalidArgument => AgentError::InvalidArgument(msg),
            Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
                AgentError::Unavailable(msg)
            }
            // Statuses built from a local error (connect, I/O, h2) carry it as
            // their source; statuses decoded off the wire never do.
            code if std::error::Error::source(&status).is_some() => {
                debug!(?code, error = %msg, "transport failure");
                AgentError::Unavailable(msg)
            }
            // The peer answered, but not as a NodeAgent: wrong service or a
            // plain HTTP server that tonic had to map a status for.
            Code::Unimplemented => AgentError::Unavailable(msg),
            code if NOT_GRPC_PREFIXES.iter().any(|p| msg.starts_with(p)) => {
                debug!(?code, error = %msg, "peer is not a node agent");
                AgentError::Unavailable(msg)
            }
            _ => AgentError::Internal(msg),
        }
    }
}

/// Status an agent returns for a lifecycle rule violation.
pub fn lifecycle_status(err: LifecycleError) -> Status {
    match err {
        LifecycleError::NotFound(msg) => Status::not_found(msg),
        LifecycleError::Conflict(msg) => Status::already_exists(msg),
        LifecycleError::FailedPrecondition(msg) => Status::failed_precondition(msg),
        LifecycleError::InvalidArgument(msg) => Status::invalid_argument(msg),
    }
}
