use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{PortMapping, Workflow, Workflows};

/// Keys outside the known schema, kept verbatim for lossless round trips.
pub type ExtraKeys = BTreeMap<String, toml::Value>;

/// A hosted-environment manifest (`.replit`).
///
/// Keys this model does not know about are kept in `extra`, here and in every
/// section, so that a manifest survives a parse/render cycle without losing
/// anything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nix: Option<NixConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_test: Option<UnitTestConfig>,
    #[serde(
        rename = "gitHubImport",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub github_import: Option<GitHubImport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<Deployment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows: Option<Workflows>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortMapping>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

impl Manifest {
    pub fn workflows(&self) -> &[Workflow] {
        self.workflows
            .as_ref()
            .map(|workflows| workflows.workflow.as_slice())
            .unwrap_or(&[])
    }

    pub fn workflow(&self, name: &str) -> Option<&Workflow> {
        self.workflows().iter().find(|workflow| workflow.name == name)
    }

    pub fn run_button(&self) -> Option<&str> {
        self.workflows
            .as_ref()
            .and_then(|workflows| workflows.run_button.as_deref())
    }

    pub fn deployment_run(&self) -> Option<&RunCommand> {
        self.deployment
            .as_ref()
            .and_then(|deployment| deployment.run.as_ref())
    }

    pub fn deployment_target(&self) -> Option<&DeploymentTarget> {
        self.deployment
            .as_ref()
            .and_then(|deployment| deployment.deployment_target.as_ref())
    }

    pub fn port_for_local(&self, local_port: u16) -> Option<&PortMapping> {
        self.ports
            .iter()
            .find(|mapping| mapping.local_port == local_port)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NixConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTestConfig {
    pub language: String,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubImport {
    #[serde(default)]
    pub required_files: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<RunCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_target: Option<DeploymentTarget>,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

/// A command as the platform accepts it: either an argv list or a single
/// string handed to a shell.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunCommand {
    Argv(Vec<String>),
    Shell(String),
}

impl RunCommand {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Argv(argv) => argv.is_empty(),
            Self::Shell(line) => line.trim().is_empty(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Argv(argv) => argv
                .iter()
                .map(|arg| quote_arg(arg))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Shell(line) => line.clone(),
        }
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./=:,@%+".contains(ch))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeploymentTarget {
    CloudRun,
    Gce,
    Autoscale,
    Vm,
    Static,
    Scheduled,
    Other(String),
}

impl DeploymentTarget {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CloudRun => "cloudrun",
            Self::Gce => "gce",
            Self::Autoscale => "autoscale",
            Self::Vm => "vm",
            Self::Static => "static",
            Self::Scheduled => "scheduled",
            Self::Other(value) => value.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for DeploymentTarget {
    fn from(value: String) -> Self {
        match value.as_str() {
            "cloudrun" => Self::CloudRun,
            "gce" => Self::Gce,
            "autoscale" => Self::Autoscale,
            "vm" => Self::Vm,
            "static" => Self::Static,
            "scheduled" => Self::Scheduled,
            _ => Self::Other(value),
        }
    }
}

impl From<DeploymentTarget> for String {
    fn from(value: DeploymentTarget) -> Self {
        match value {
            DeploymentTarget::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}
