//! Conversions between domain types and wire messages.

use edge_core::types::{LifecycleState, UnknownVariant, Workload, WorkloadKind, WorkloadSpec};

use crate::proto;

impl From<&Workload> for proto::Workload {
    fn from(workload: &Workload) -> Self {
        let kind = match workload.spec.kind {
            WorkloadKind::Container => proto::WorkloadKind::Container,
            WorkloadKind::Vnf => proto::WorkloadKind::Vnf,
        };
        proto::Workload {
            id: workload.id.clone(),
            kind: kind as i32,
            name: workload.spec.name.clone(),
            image: workload.spec.image.clone(),
            command: workload.spec.command.clone(),
        }
    }
}

impl TryFrom<proto::Workload> for Workload {
    type Error = UnknownVariant;

    fn try_from(msg: proto::Workload) -> Result<Self, Self::Error> {
        let kind = match proto::WorkloadKind::try_from(msg.kind) {
            Ok(proto::WorkloadKind::Container) => WorkloadKind::Container,
            Ok(proto::WorkloadKind::Vnf) => WorkloadKind::Vnf,
            Ok(proto::WorkloadKind::Unspecified) | Err(_) => {
                return Err(UnknownVariant {
                    kind: "workload kind",
                    value: msg.kind.to_string(),
                });
            }
        };
        Ok(Workload {
            id: msg.id,
            spec: WorkloadSpec {
                kind,
                name: msg.name,
                image: msg.image,
                command: msg.command,
            },
        })
    }
}

impl From<LifecycleState> for proto::LifecycleStatus {
    fn from(state: LifecycleState) -> Self {
        let status = match state {
            LifecycleState::Ready => proto::Status::Ready,
            LifecycleState::Running => proto::Status::Running,
            LifecycleState::Stopped => proto::Status::Stopped,
        };
        proto::LifecycleStatus {
            status: status as i32,
        }
    }
}

impl TryFrom<proto::LifecycleStatus> for LifecycleState {
    type Error = UnknownVariant;

    fn try_from(msg: proto::LifecycleStatus) -> Result<Self, Self::Error> {
        match proto::Status::try_from(msg.status) {
            Ok(proto::Status::Ready) => Ok(LifecycleState::Ready),
            Ok(proto::Status::Running) => Ok(LifecycleState::Running),
            Ok(proto::Status::Stopped) => Ok(LifecycleState::Stopped),
            Ok(proto::Status::Unknown) | Err(_) => Err(UnknownVariant {
                kind: "lifecycle status",
                value: msg.status.to_string(),
            }),
        }
    }
}
