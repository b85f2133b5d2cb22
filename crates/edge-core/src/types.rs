//! Shared types used across EdgeGrid crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a registered node.
pub type NodeId = String;

/// Unique identifier for a registered workload.
pub type WorkloadId = String;

/// Unique identifier for a node/workload association.
pub type AssociationId = String;

/// Caller-chosen identifier for a deployed workload instance.
pub type InstanceId = String;

/// A wire value that does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// ── Workload ──────────────────────────────────────────────────────

/// What sort of unit a workload is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadKind {
    /// A containerized application.
    Container,
    /// A virtualized network function.
    Vnf,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Container => "container",
            WorkloadKind::Vnf => "vnf",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The deployable definition of a workload, independent of any node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub kind: WorkloadKind,
    pub name: String,
    /// Image reference (container image or VM image).
    pub image: String,
    /// Optional command and arguments overriding the image default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

/// A workload definition together with its identifier.
///
/// Registered workloads carry a store-minted id. When the same shape is
/// handed to a node agent for deployment, `id` is the caller-chosen
/// instance id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub id: String,
    #[serde(flatten)]
    pub spec: WorkloadSpec,
}

// ── Lifecycle ─────────────────────────────────────────────────────

/// Lifecycle state of a deployed workload instance.
///
/// There is no `Undeployed` variant: an instance that is not tracked
/// simply has no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Ready,
    Running,
    Stopped,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Ready => "ready",
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state-changing command issued against a deployed instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCommand {
    Start,
    Stop,
    Restart,
}

impl LifecycleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleCommand::Start => "start",
            LifecycleCommand::Stop => "stop",
            LifecycleCommand::Restart => "restart",
        }
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
