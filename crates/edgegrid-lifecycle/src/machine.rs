//! Instance lifecycle state machine.
//!
//! | Command | From | To |
//! |---|---|---|
//! | start | Ready, Stopped | Running |
//! | stop | Running | Stopped |
//! | restart | Running | Running |
//!
//! Deploy, redeploy and undeploy are handled by the instance table since
//! they create, replace or remove the record rather than move its state.

use edge_core::types::{LifecycleCommand, LifecycleState, Workload};

use crate::error::{LifecycleError, LifecycleResult};

/// A deployed workload instance as tracked by its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadInstance {
    /// Definition the instance was (re)deployed with. `workload.id` is the
    /// instance id.
    pub workload: Workload,
    pub state: LifecycleState,
}

impl WorkloadInstance {
    /// A freshly deployed instance.
    pub fn deployed(workload: Workload) -> Self {
        Self {
            workload,
            state: LifecycleState::Ready,
        }
    }

    pub fn id(&self) -> &str {
        &self.workload.id
    }

    /// Apply `command`, moving to the resulting state or leaving the
    /// instance untouched on error.
    pub fn apply(&mut self, command: LifecycleCommand) -> LifecycleResult<LifecycleState> {
        let next = transition(self.id(), self.state, command)?;
        self.state = next;
        Ok(next)
    }

    /// Swap in a new definition, keeping the current state.
    pub fn redeploy(&mut self, workload: Workload) {
        self.workload = workload;
    }
}

/// The state `command` leads to from `state`, for the instance `id`.
pub fn transition(
    id: &str,
    state: LifecycleState,
    command: LifecycleCommand,
) -> LifecycleResult<LifecycleState> {
    use LifecycleCommand::*;
    use LifecycleState::*;

    match (command, state) {
        (Start, Ready | Stopped) => Ok(Running),
        (Start, Running) => Err(LifecycleError::FailedPrecondition(format!(
            "instance {id} not stopped or ready"
        ))),
        (Stop, Running) => Ok(Stopped),
        // Restart only validates that the instance is live.
        (Restart, Running) => Ok(Running),
        (Stop | Restart, Ready | Stopped) => Err(LifecycleError::FailedPrecondition(format!(
            "instance {id} not running"
        ))),
    }
}
