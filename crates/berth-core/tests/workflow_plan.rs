use std::path::PathBuf;

use berth_core::codec::{self, ManifestFormat};
use berth_core::models::{CoreErrorKind, Manifest, TaskKind, WorkflowMode};
use berth_core::plan::{PlanNode, PlanStep, deployment_command, plan_workflow};

const GAP_FINDER: &str = include_str!("fixtures/replit/gap_finder.toml");
const CYCLIC: &str = include_str!("fixtures/replit/cyclic.toml");

fn parse(text: &str) -> Manifest {
    codec::parse(text, ManifestFormat::Toml).expect("fixture should parse")
}

#[test]
fn run_button_plan_follows_workflow_references() {
    let manifest = parse(GAP_FINDER);
    let plan = plan_workflow(&manifest, None).expect("plan should resolve");

    assert_eq!(plan.workflow(), "Project");
    let PlanNode::Group { mode, nodes, .. } = &plan.root else {
        panic!("expected group root");
    };
    assert_eq!(*mode, WorkflowMode::Parallel);
    assert_eq!(nodes.len(), 1);

    let PlanNode::Group {
        workflow,
        mode,
        nodes,
    } = &nodes[0]
    else {
        panic!("expected nested workflow group");
    };
    assert_eq!(workflow, "Streamlit Server");
    assert_eq!(*mode, WorkflowMode::Sequential);
    assert_eq!(nodes.len(), 1);

    let steps = plan.steps();
    assert_eq!(steps.len(), 1);
    let PlanStep::Shell {
        workflow,
        command,
        wait_for_port,
    } = steps[0]
    else {
        panic!("expected shell step");
    };
    assert_eq!(workflow, "Streamlit Server");
    assert_eq!(command.program, PathBuf::from("sh"));
    assert_eq!(
        command.args,
        vec!["-c", "streamlit run main.py --server.port 5000"]
    );
    assert_eq!(*wait_for_port, Some(5000));
}

#[test]
fn named_workflow_overrides_run_button() {
    let manifest = parse(GAP_FINDER);
    let plan = plan_workflow(&manifest, Some("Streamlit Server")).unwrap();

    assert_eq!(plan.workflow(), "Streamlit Server");
    assert_eq!(plan.steps().len(), 1);
}

#[test]
fn cycles_are_rejected_with_the_path() {
    let manifest = parse(CYCLIC);
    let error = plan_workflow(&manifest, None).unwrap_err();

    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    assert_eq!(
        error.message,
        "workflow references form a cycle: Project -> Web -> Api -> Web"
    );
}

#[test]
fn unknown_workflow_and_missing_run_button_are_rejected() {
    let manifest = parse(GAP_FINDER);
    let error = plan_workflow(&manifest, Some("Nope")).unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    assert!(error.message.contains("`Nope`"));

    let error = plan_workflow(&Manifest::default(), None).unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
}

#[test]
fn shell_steps_carry_manifest_env_and_unknown_tasks_are_unsupported() {
    let text = r#"
[env]
STREAMLIT_SERVER_PORT = "5000"

[workflows]
runButton = "Run"

[[workflows.workflow]]
name = "Run"

[[workflows.workflow.tasks]]
task = "packager.installForAll"

[[workflows.workflow.tasks]]
task = "shell.exec"
args = "streamlit run main.py"

[[workflows.workflow.tasks]]
task = "deploy.magic"
args = "now"
"#;
    let manifest = parse(text);
    let plan = plan_workflow(&manifest, None).unwrap();
    let steps = plan.steps();

    assert_eq!(steps.len(), 3);
    assert!(matches!(steps[0], PlanStep::InstallPackages { .. }));

    let PlanStep::Shell { command, .. } = steps[1] else {
        panic!("expected shell step");
    };
    assert_eq!(
        command.env.get("STREAMLIT_SERVER_PORT").map(String::as_str),
        Some("5000")
    );

    let PlanStep::Unsupported { task, args, .. } = steps[2] else {
        panic!("expected unsupported step");
    };
    assert_eq!(*task, TaskKind::Other("deploy.magic".to_string()));
    assert_eq!(args.as_deref(), Some("now"));
}

#[test]
fn shell_task_without_args_cannot_be_planned() {
    let text = r#"
[[workflows.workflow]]
name = "Run"

[[workflows.workflow.tasks]]
task = "shell.exec"
"#;
    let error = plan_workflow(&parse(text), Some("Run")).unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
}

#[test]
fn deployment_command_is_built_from_run_argv() {
    let manifest = parse(GAP_FINDER);
    let command = deployment_command(&manifest)
        .unwrap()
        .expect("deployment command");

    assert_eq!(command.program, PathBuf::from("sh"));
    assert_eq!(command.args[0], "-c");
    assert!(command.args[1].contains("--server.headless true"));

    assert_eq!(deployment_command(&Manifest::default()).unwrap(), None);
}

#[test]
fn empty_deployment_command_is_invalid() {
    let manifest = parse("[deployment]\nrun = []\n");
    let error = deployment_command(&manifest).unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
}
