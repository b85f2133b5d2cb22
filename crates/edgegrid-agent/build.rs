//! Generates the `NodeAgent` gRPC client and server from the message types
//! declared in `src/proto.rs`. The manual builder needs no `protoc`.

use tonic_build::manual::{Builder, Method, Service};

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::proto::{input}"))
        .output_type(format!("crate::proto::{output}"))
        .codec_path("crate::codec::AgentCodec")
        .build()
}

fn main() {
    let service = Service::builder()
        .name("NodeAgent")
        .package("edgegrid.agent.v1")
        .method(unary("deploy", "Deploy", "Workload", "Ack"))
        .method(unary("redeploy", "Redeploy", "Workload", "Ack"))
        .method(unary("get_status", "GetStatus", "InstanceRef", "LifecycleStatus"))
        .method(unary("start", "Start", "LifecycleCommand", "Ack"))
        .method(unary("stop", "Stop", "LifecycleCommand", "Ack"))
        .method(unary("restart", "Restart", "LifecycleCommand", "Ack"))
        .method(unary("undeploy", "Undeploy", "InstanceRef", "Ack"))
        .build();

    Builder::new().compile(&[service]);

    println!("cargo:rerun-if-changed=build.rs");
}
