use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::models::ExtraKeys;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflows {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_button: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workflow: Vec<Workflow>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<WorkflowAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<WorkflowMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<WorkflowTask>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

impl Workflow {
    pub fn effective_mode(&self) -> WorkflowMode {
        self.mode.unwrap_or_default()
    }
}

/// Authors are numeric account ids in most manifests; some tooling writes a
/// name such as `"agent"` instead.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowAuthor {
    Id(u64),
    Name(String),
}

impl Display for WorkflowAuthor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTask {
    pub task: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_port: Option<u16>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

impl WorkflowTask {
    pub fn new(task: TaskKind, args: impl Into<String>) -> Self {
        Self {
            task,
            args: Some(args.into()),
            wait_for_port: None,
            extra: ExtraKeys::new(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    ShellExec,
    PackagerInstallForAll,
    WorkflowRun,
    Other(String),
}

impl TaskKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ShellExec => "shell.exec",
            Self::PackagerInstallForAll => "packager.installForAll",
            Self::WorkflowRun => "workflow.run",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "shell.exec" => Self::ShellExec,
            "packager.installForAll" => Self::PackagerInstallForAll,
            "workflow.run" => Self::WorkflowRun,
            _ => Self::Other(value),
        }
    }
}

impl From<TaskKind> for String {
    fn from(value: TaskKind) -> Self {
        match value {
            TaskKind::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}
