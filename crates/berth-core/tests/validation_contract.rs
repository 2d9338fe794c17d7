use berth_core::codec::{self, ManifestFormat};
use berth_core::models::{DiagnosticCode, Manifest, PortMapping, Severity};
use berth_core::validation::{ValidationReport, validate};

const GAP_FINDER: &str = include_str!("fixtures/replit/gap_finder.toml");
const MINIMAL: &str = include_str!("fixtures/replit/minimal.toml");
const BROKEN: &str = include_str!("fixtures/replit/broken.toml");
const CYCLIC: &str = include_str!("fixtures/replit/cyclic.toml");

fn parse(text: &str) -> Manifest {
    codec::parse(text, ManifestFormat::Toml).expect("fixture should parse")
}

fn diagnostic_at(report: &ValidationReport, location: &str) -> DiagnosticCode {
    report
        .diagnostics
        .iter()
        .find(|diagnostic| diagnostic.location == location)
        .map(|diagnostic| diagnostic.code)
        .unwrap_or_else(|| panic!("no diagnostic at {location}: {:#?}", report.diagnostics))
}

#[test]
fn well_formed_fixtures_are_clean() {
    for fixture in [GAP_FINDER, MINIMAL] {
        let report = validate(&parse(fixture));
        assert!(
            report.is_clean(),
            "unexpected diagnostics: {:#?}",
            report.diagnostics
        );
    }
}

#[test]
fn empty_manifest_is_clean() {
    assert!(validate(&Manifest::default()).is_clean());
}

#[test]
fn broken_fixture_reports_every_problem() {
    let report = validate(&parse(BROKEN));
    assert!(report.has_errors());

    assert_eq!(diagnostic_at(&report, "entrypoint"), DiagnosticCode::EntrypointAbsolute);
    assert_eq!(diagnostic_at(&report, "modules[1]"), DiagnosticCode::ModuleBlank);
    assert_eq!(diagnostic_at(&report, "nix.packages[1]"), DiagnosticCode::NixPackageBlank);
    assert_eq!(
        diagnostic_at(&report, "nix.packages[2]"),
        DiagnosticCode::NixPackageDuplicate
    );
    assert_eq!(
        diagnostic_at(&report, "deployment.run"),
        DiagnosticCode::DeploymentRunEmpty
    );
    assert_eq!(
        diagnostic_at(&report, "deployment.deploymentTarget"),
        DiagnosticCode::DeploymentTargetUnknown
    );
    assert_eq!(diagnostic_at(&report, "ports[0].localPort"), DiagnosticCode::PortZero);
    assert_eq!(
        diagnostic_at(&report, "ports[1].externalPort"),
        DiagnosticCode::ExternalPortDuplicate
    );
    assert_eq!(
        diagnostic_at(&report, "ports[2].localPort"),
        DiagnosticCode::LocalPortDuplicate
    );
    assert_eq!(
        diagnostic_at(&report, "ports[2].externalPort"),
        DiagnosticCode::ExternalPortUnroutable
    );
    assert_eq!(
        diagnostic_at(&report, "workflows.workflow[0].tasks[0].args"),
        DiagnosticCode::TaskArgsMissing
    );
    assert_eq!(
        diagnostic_at(&report, "workflows.workflow[0].tasks[1].args"),
        DiagnosticCode::TaskWorkflowUnknown
    );
    assert_eq!(
        diagnostic_at(&report, "workflows.workflow[0].tasks[2].task"),
        DiagnosticCode::TaskKindUnknown
    );
    assert_eq!(
        diagnostic_at(&report, "workflows.workflow[0].tasks[3].waitForPort"),
        DiagnosticCode::WaitForPortUndeclared
    );
    assert_eq!(
        diagnostic_at(&report, "workflows.workflow[1].name"),
        DiagnosticCode::WorkflowNameDuplicate
    );
    assert_eq!(
        diagnostic_at(&report, "workflows.runButton"),
        DiagnosticCode::RunButtonUnknown
    );

    assert!(!report.contains(DiagnosticCode::WorkflowCycle));
    assert_eq!(report.errors().count(), 9);
    assert_eq!(report.warnings().count(), 7);
}

#[test]
fn cyclic_workflows_are_an_error() {
    let report = validate(&parse(CYCLIC));
    let cycles: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.code == DiagnosticCode::WorkflowCycle)
        .collect();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].severity, Severity::Error);
    assert!(cycles[0].message.ends_with("Api -> Web -> Api"));
}

#[test]
fn zero_external_port_is_an_error_not_an_unroutable_warning() {
    let manifest = Manifest {
        ports: vec![PortMapping::new(3000, 0)],
        ..Manifest::default()
    };
    let report = validate(&manifest);

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code, DiagnosticCode::PortZero);
    assert_eq!(report.diagnostics[0].location, "ports[0].externalPort");
}

#[test]
fn workflows_without_run_button_warn() {
    let text = r#"
[[workflows.workflow]]
name = "Run"

[[workflows.workflow.tasks]]
task = "shell.exec"
args = "python main.py"
"#;
    let report = validate(&parse(text));

    assert!(!report.has_errors());
    assert!(report.contains(DiagnosticCode::RunButtonMissing));
}

#[test]
fn blank_deployment_program_is_an_error() {
    let text = "[deployment]\nrun = [\" \", \"main.py\"]\n";
    let report = validate(&parse(text));

    assert_eq!(
        diagnostic_at(&report, "deployment.run[0]"),
        DiagnosticCode::DeploymentProgramBlank
    );
}
