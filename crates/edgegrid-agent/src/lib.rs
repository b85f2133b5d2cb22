//! edgegrid-agent: the node agent RPC surface.
//!
//! The agent side serves an instance table over the `NodeAgent` gRPC
//! service ([`AgentServer`]). The control plane side reaches agents through
//! the [`AgentClient`] trait, resolved per node by an [`AgentConnector`].
//! [`LocalAgent`] and [`LocalConnector`] skip the transport for tests and
//! single-process setups.

pub mod client;
mod codec;
pub mod connector;
mod convert;
pub mod error;
pub mod local;
pub mod proto;
pub mod server;

pub use client::{AgentClient, ClientOptions, GrpcAgentClient};
pub use connector::{AgentConnector, GrpcConnector, LocalConnector};
pub use error::{AgentError, AgentResult};
pub use local::LocalAgent;
pub use server::AgentServer;
