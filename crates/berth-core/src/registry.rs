use crate::models::{DeploymentTarget, TaskKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TaskKindDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub requires_args: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeploymentTargetDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub serves_ports: bool,
}

const ALL_TASK_KINDS: [TaskKindDescriptor; 3] = [
    TaskKindDescriptor {
        id: "shell.exec",
        display_name: "Shell command",
        requires_args: true,
    },
    TaskKindDescriptor {
        id: "packager.installForAll",
        display_name: "Install project packages",
        requires_args: false,
    },
    TaskKindDescriptor {
        id: "workflow.run",
        display_name: "Run another workflow",
        requires_args: true,
    },
];

const ALL_DEPLOYMENT_TARGETS: [DeploymentTargetDescriptor; 6] = [
    DeploymentTargetDescriptor {
        id: "cloudrun",
        display_name: "Autoscale (Cloud Run)",
        serves_ports: true,
    },
    DeploymentTargetDescriptor {
        id: "autoscale",
        display_name: "Autoscale",
        serves_ports: true,
    },
    DeploymentTargetDescriptor {
        id: "gce",
        display_name: "Reserved VM (GCE)",
        serves_ports: true,
    },
    DeploymentTargetDescriptor {
        id: "vm",
        display_name: "Reserved VM",
        serves_ports: true,
    },
    DeploymentTargetDescriptor {
        id: "static",
        display_name: "Static site",
        serves_ports: false,
    },
    DeploymentTargetDescriptor {
        id: "scheduled",
        display_name: "Scheduled job",
        serves_ports: false,
    },
];

/// External ports the platform will route traffic to.
pub const ROUTABLE_EXTERNAL_PORTS: &[u16] = &[
    80, 3000, 3001, 3002, 3003, 4200, 5000, 5173, 6000, 6800, 8000, 8008, 8080, 8081, 8099, 9000,
];

pub fn task_kinds() -> &'static [TaskKindDescriptor] {
    &ALL_TASK_KINDS
}

pub fn task_kind(kind: &TaskKind) -> Option<&'static TaskKindDescriptor> {
    ALL_TASK_KINDS
        .iter()
        .find(|descriptor| descriptor.id == kind.as_str())
}

pub fn deployment_targets() -> &'static [DeploymentTargetDescriptor] {
    &ALL_DEPLOYMENT_TARGETS
}

pub fn deployment_target(
    target: &DeploymentTarget,
) -> Option<&'static DeploymentTargetDescriptor> {
    ALL_DEPLOYMENT_TARGETS
        .iter()
        .find(|descriptor| descriptor.id == target.as_str())
}

pub fn is_routable_external_port(port: u16) -> bool {
    ROUTABLE_EXTERNAL_PORTS.contains(&port)
}
