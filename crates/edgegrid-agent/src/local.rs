//! In-process agent.

use std::sync::Arc;

use async_trait::async_trait;

use edge_core::types::{LifecycleState, Workload};
use edgegrid_lifecycle::InstanceTable;

use crate::client::AgentClient;
use crate::error::AgentResult;

/// [`AgentClient`] that applies operations directly to an [`InstanceTable`]
/// in the same process, with no transport in between.
#[derive(Clone, Default)]
pub struct LocalAgent {
    table: Arc<InstanceTable>,
}

impl LocalAgent {
    pub fn new(table: Arc<InstanceTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<InstanceTable> {
        &self.table
    }
}

#[async_trait]
impl AgentClient for LocalAgent {
    async fn deploy(&self, workload: &Workload) -> AgentResult<()> {
        Ok(self.table.deploy(workload.clone()).await?)
    }

    async fn redeploy(&self, workload: &Workload) -> AgentResult<()> {
        Ok(self.table.redeploy(workload.clone()).await?)
    }

    async fn start(&self, id: &str) -> AgentResult<()> {
        Ok(self.table.start(id).await?)
    }

    async fn stop(&self, id: &str) -> AgentResult<()> {
        Ok(self.table.stop(id).await?)
    }

    async fn restart(&self, id: &str) -> AgentResult<()> {
        Ok(self.table.restart(id).await?)
    }

    async fn undeploy(&self, id: &str) -> AgentResult<()> {
        Ok(self.table.undeploy(id).await?)
    }

    async fn status(&self, id: &str) -> AgentResult<LifecycleState> {
        Ok(self.table.status(id).await?)
    }
}
