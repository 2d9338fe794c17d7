use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    EntrypointBlank,
    EntrypointAbsolute,
    ModuleBlank,
    NixPackageBlank,
    NixPackageDuplicate,
    DeploymentRunEmpty,
    DeploymentProgramBlank,
    DeploymentTargetUnknown,
    PortZero,
    LocalPortDuplicate,
    ExternalPortDuplicate,
    ExternalPortUnroutable,
    WorkflowNameBlank,
    WorkflowNameDuplicate,
    WorkflowEmpty,
    RunButtonUnknown,
    RunButtonMissing,
    TaskKindUnknown,
    TaskArgsMissing,
    TaskWorkflowUnknown,
    WorkflowCycle,
    WaitForPortUndeclared,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    /// Dotted key path of the offending value, e.g. `ports[1].localPort`.
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(
        code: DiagnosticCode,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        code: DiagnosticCode,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{label}[{:?}] {}: {}", self.code, self.location, self.message)
    }
}
