pub mod diagnostic;
pub mod error;
pub mod manifest;
pub mod ports;
pub mod workflow;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use error::{CoreError, CoreErrorKind, CoreResult};
pub use manifest::{
    Deployment, DeploymentTarget, ExtraKeys, GitHubImport, Manifest, NixConfig, RunCommand,
    UnitTestConfig,
};
pub use ports::PortMapping;
pub use workflow::{TaskKind, Workflow, WorkflowAuthor, WorkflowMode, WorkflowTask, Workflows};
