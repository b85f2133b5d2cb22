//! Wire types for the `edgegrid.agent.v1.NodeAgent` service.
//!
//! ```text
//! service NodeAgent {
//!   rpc Deploy(Workload) returns (Ack);
//!   rpc Redeploy(Workload) returns (Ack);
//!   rpc GetStatus(InstanceRef) returns (LifecycleStatus);
//!   rpc Start(LifecycleCommand) returns (Ack);
//!   rpc Stop(LifecycleCommand) returns (Ack);
//!   rpc Restart(LifecycleCommand) returns (Ack);
//!   rpc Undeploy(InstanceRef) returns (Ack);
//! }
//! ```
//!
//! Client and server stubs are generated by `build.rs`.

/// A workload definition; `id` is the caller-chosen instance id.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Workload {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(enumeration = "WorkloadKind", tag = "2")]
    pub kind: i32,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub image: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "5")]
    pub command: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceRef {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LifecycleCommand {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct LifecycleStatus {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Ack {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum WorkloadKind {
    Unspecified = 0,
    Container = 1,
    Vnf = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Status {
    Unknown = 0,
    Ready = 1,
    Running = 2,
    Stopped = 3,
}

include!(concat!(env!("OUT_DIR"), "/edgegrid.agent.v1.NodeAgent.rs"));
