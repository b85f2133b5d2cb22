//! edgegrid-orchestrator: the control plane's orchestration service.
//!
//! Validates association requests and persists them through
//! `edgegrid-state`, and drives instance lifecycles on remote nodes through
//! `edgegrid-agent`. Errors from both are folded into one
//! [`OrchestratorError`] taxonomy that the API layer maps to status codes.

pub mod error;
mod locks;
pub mod orchestrator;
pub mod request;

pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::Orchestrator;
pub use request::{CreateAssociationRequest, RegisterNodeRequest, RegisterWorkloadRequest};
