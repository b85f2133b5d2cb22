//! Concurrent instance table.
//!
//! Instances live in a map keyed by instance id. Each entry has its own
//! async mutex, so operations on one instance are applied one at a time
//! against a consistent prior state while operations on different
//! instances proceed independently. The map lock itself is only held for
//! lookups, inserts and removals, never across a transition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use edge_core::types::{InstanceId, LifecycleCommand, LifecycleState, Workload};

use crate::error::{LifecycleError, LifecycleResult};
use crate::machine::WorkloadInstance;

/// `None` once the instance has been undeployed. A caller that looked the
/// slot up before the undeploy finds it empty and reports not-found.
type Slot = Arc<Mutex<Option<WorkloadInstance>>>;

/// The set of workload instances hosted by one agent.
#[derive(Default)]
pub struct InstanceTable {
    slots: RwLock<HashMap<InstanceId, Slot>>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new instance in the `Ready` state.
    ///
    /// The instance id is `workload.id`, chosen by the caller. Deploying an
    /// id that is already tracked is a conflict; the existing instance is
    /// left untouched.
    pub async fn deploy(&self, workload: Workload) -> LifecycleResult<()> {
        if workload.id.is_empty() {
            return Err(LifecycleError::InvalidArgument(
                "instance id must not be empty".to_string(),
            ));
        }

        let mut slots = self.slots.write().await;
        if slots.contains_key(&workload.id) {
            return Err(LifecycleError::already_deployed(&workload.id));
        }

        let id = workload.id.clone();
        let kind = workload.spec.kind;
        slots.insert(
            id.clone(),
            Arc::new(Mutex::new(Some(WorkloadInstance::deployed(workload)))),
        );
        info!(instance_id = %id, %kind, "instance deployed");
        Ok(())
    }

    /// Replace an instance's definition, preserving its state.
    pub async fn redeploy(&self, workload: Workload) -> LifecycleResult<()> {
        let id = workload.id.clone();
        self.with_instance(&id, |instance| {
            instance.redeploy(workload);
            Ok(())
        })
        .await?;
        info!(instance_id = %id, "instance redeployed");
        Ok(())
    }

    /// Apply a lifecycle command, returning the resulting state.
    pub async fn apply(
        &self,
        id: &str,
        command: LifecycleCommand,
    ) -> LifecycleResult<LifecycleState> {
        let state = self
            .with_instance(id, |instance| instance.apply(command))
            .await?;
        info!(instance_id = %id, %command, %state, "lifecycle command applied");
        Ok(state)
    }

    pub async fn start(&self, id: &str) -> LifecycleResult<()> {
        self.apply(id, LifecycleCommand::Start).await.map(|_| ())
    }

    pub async fn stop(&self, id: &str) -> LifecycleResult<()> {
        self.apply(id, LifecycleCommand::Stop).await.map(|_| ())
    }

    pub async fn restart(&self, id: &str) -> LifecycleResult<()> {
        self.apply(id, LifecycleCommand::Restart).await.map(|_| ())
    }

    /// Current state of an instance.
    pub async fn status(&self, id: &str) -> LifecycleResult<LifecycleState> {
        self.with_instance(id, |instance| Ok(instance.state)).await
    }

    /// Snapshot of an instance, definition included.
    pub async fn get(&self, id: &str) -> LifecycleResult<WorkloadInstance> {
        self.with_instance(id, |instance| Ok(instance.clone())).await
    }

    /// Stop tracking an instance, whatever its state.
    pub async fn undeploy(&self, id: &str) -> LifecycleResult<()> {
        let slot = self
            .slots
            .write()
            .await
            .remove(id)
            .ok_or_else(|| LifecycleError::not_found(id))?;

        // Wait out any operation already holding the slot, then empty it so
        // later holders of the same slot see the instance as gone.
        slot.lock().await.take();
        info!(instance_id = %id, "instance undeployed");
        Ok(())
    }

    /// Number of tracked instances.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn with_instance<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut WorkloadInstance) -> LifecycleResult<T>,
    ) -> LifecycleResult<T> {
        let slot = self
            .slots
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| LifecycleError::not_found(id))?;

        let mut guard = slot.lock().await;
        match guard.as_mut() {
            Some(instance) => f(instance),
            None => {
                debug!(instance_id = %id, "instance undeployed while waiting");
                Err(LifecycleError::not_found(id))
            }
        }
    }
}
