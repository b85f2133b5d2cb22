//! Lifecycle error types.

use thiserror::Error;

/// Violations of the instance lifecycle rules.
///
/// Each variant carries the full human-readable message so it can cross
/// the RPC boundary unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    InvalidArgument(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    pub fn not_found(id: &str) -> Self {
        LifecycleError::NotFound(format!("instance {id} not found"))
    }

    pub fn already_deployed(id: &str) -> Self {
        LifecycleError::Conflict(format!("instance {id} already deployed"))
    }
}
