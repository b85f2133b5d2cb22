//! Node agent client.
//!
//! [`AgentClient`] is the control plane's view of one node agent: the seven
//! lifecycle operations, each a single request/response exchange. The gRPC
//! implementation connects lazily and puts a deadline on every call; nothing
//! is retried or queued.

use std::time::Duration;

use async_trait::async_trait;
use tonic::Request;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use edge_core::config::ControlPlaneConfig;
use edge_core::types::{LifecycleCommand, LifecycleState, Workload};

use crate::error::{AgentError, AgentResult};
use crate::proto;
use crate::proto::node_agent_client::NodeAgentClient;

/// Operations a node agent performs on workload instances.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Track a new instance, `workload.id` being its id.
    async fn deploy(&self, workload: &Workload) -> AgentResult<()>;

    /// Replace the definition of a tracked instance.
    async fn redeploy(&self, workload: &Workload) -> AgentResult<()>;

    async fn start(&self, id: &str) -> AgentResult<()>;

    async fn stop(&self, id: &str) -> AgentResult<()>;

    async fn restart(&self, id: &str) -> AgentResult<()>;

    async fn undeploy(&self, id: &str) -> AgentResult<()>;

    async fn status(&self, id: &str) -> AgentResult<LifecycleState>;

    /// Dispatch a lifecycle command to the matching operation.
    async fn command(&self, id: &str, command: LifecycleCommand) -> AgentResult<()> {
        match command {
            LifecycleCommand::Start => self.start(id).await,
            LifecycleCommand::Stop => self.stop(id).await,
            LifecycleCommand::Restart => self.restart(id).await,
        }
    }
}

/// Channel settings for gRPC agent clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    /// Deadline applied to every call.
    pub rpc_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            rpc_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&ControlPlaneConfig> for ClientOptions {
    fn from(config: &ControlPlaneConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            rpc_timeout: config.rpc_timeout(),
        }
    }
}

/// [`AgentClient`] speaking the `NodeAgent` gRPC service.
#[derive(Debug, Clone)]
pub struct GrpcAgentClient {
    endpoint: String,
    rpc_timeout: Duration,
    inner: NodeAgentClient<Channel>,
}

impl GrpcAgentClient {
    /// Build a client for `endpoint` (e.g. `http://10.0.0.7:50051`).
    ///
    /// No connection is made until the first call. Must be called from
    /// within a tokio runtime.
    pub fn connect_lazy(endpoint: &str, options: &ClientOptions) -> AgentResult<Self> {
        let channel = parse_endpoint(endpoint)?
            .connect_timeout(options.connect_timeout)
            .timeout(options.rpc_timeout)
            .connect_lazy();

        debug!(%endpoint, "agent client created");
        Ok(Self {
            endpoint: endpoint.to_string(),
            rpc_timeout: options.rpc_timeout,
            inner: NodeAgentClient::new(channel),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.rpc_timeout);
        request
    }

    fn client(&self) -> NodeAgentClient<Channel> {
        // Channels multiplex; a clone per call avoids holding `&mut self`.
        self.inner.clone()
    }

    fn command_message(id: &str) -> proto::LifecycleCommand {
        proto::LifecycleCommand { id: id.to_string() }
    }
}

#[async_trait]
impl AgentClient for GrpcAgentClient {
    async fn deploy(&self, workload: &Workload) -> AgentResult<()> {
        self.client()
            .deploy(self.request(proto::Workload::from(workload)))
            .await?;
        Ok(())
    }

    async fn redeploy(&self, workload: &Workload) -> AgentResult<()> {
        self.client()
            .redeploy(self.request(proto::Workload::from(workload)))
            .await?;
        Ok(())
    }

    async fn start(&self, id: &str) -> AgentResult<()> {
        self.client()
            .start(self.request(Self::command_message(id)))
            .await?;
        Ok(())
    }

    async fn stop(&self, id: &str) -> AgentResult<()> {
        self.client()
            .stop(self.request(Self::command_message(id)))
            .await?;
        Ok(())
    }

    async fn restart(&self, id: &str) -> AgentResult<()> {
        self.client()
            .restart(self.request(Self::command_message(id)))
            .await?;
        Ok(())
    }

    async fn undeploy(&self, id: &str) -> AgentResult<()> {
        self.client()
            .undeploy(self.request(proto::InstanceRef { id: id.to_string() }))
            .await?;
        Ok(())
    }

    async fn status(&self, id: &str) -> AgentResult<LifecycleState> {
        let response = self
            .client()
            .get_status(self.request(proto::InstanceRef { id: id.to_string() }))
            .await?
            .into_inner();

        LifecycleState::try_from(response)
            .map_err(|e| AgentError::Unavailable(format!("malformed status response: {e}")))
    }
}

/// Parse an agent URI without connecting.
pub fn parse_endpoint(endpoint: &str) -> AgentResult<Endpoint> {
    Endpoint::from_shared(endpoint.to_string())
        .map_err(|e| AgentError::Unavailable(format!("invalid endpoint {endpoint}: {e}")))
}
