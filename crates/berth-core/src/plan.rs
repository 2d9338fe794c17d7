//! Resolution of a workflow into the tree of steps the platform would run.
//!
//! Nothing here executes anything: the planner only follows `workflow.run`
//! references and turns each task into a [`PlanStep`].

use crate::command::CommandSpec;
use crate::models::{CoreError, CoreErrorKind, CoreResult, Manifest, TaskKind, WorkflowMode};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanStep {
    Shell {
        workflow: String,
        command: CommandSpec,
        wait_for_port: Option<u16>,
    },
    InstallPackages {
        workflow: String,
    },
    Unsupported {
        workflow: String,
        task: TaskKind,
        args: Option<String>,
    },
}

impl PlanStep {
    pub fn workflow(&self) -> &str {
        match self {
            Self::Shell { workflow, .. }
            | Self::InstallPackages { workflow }
            | Self::Unsupported { workflow, .. } => workflow,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanNode {
    Group {
        workflow: String,
        mode: WorkflowMode,
        nodes: Vec<PlanNode>,
    },
    Step(PlanStep),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkflowPlan {
    pub root: PlanNode,
}

impl WorkflowPlan {
    pub fn workflow(&self) -> &str {
        match &self.root {
            PlanNode::Group { workflow, .. } => workflow,
            PlanNode::Step(step) => step.workflow(),
        }
    }

    /// Leaf steps in declaration order.
    pub fn steps(&self) -> Vec<&PlanStep> {
        let mut steps = Vec::new();
        collect_steps(&self.root, &mut steps);
        steps
    }
}

fn collect_steps<'a>(node: &'a PlanNode, steps: &mut Vec<&'a PlanStep>) {
    match node {
        PlanNode::Group { nodes, .. } => {
            for child in nodes {
                collect_steps(child, steps);
            }
        }
        PlanNode::Step(step) => steps.push(step),
    }
}

/// Plans `name`, or the run-button workflow when `name` is `None`.
pub fn plan_workflow(manifest: &Manifest, name: Option<&str>) -> CoreResult<WorkflowPlan> {
    let name = match name {
        Some(name) => name,
        None => manifest.run_button().ok_or_else(|| {
            invalid_input("no workflow name given and the manifest sets no run button")
        })?,
    };

    let mut stack = Vec::new();
    let root = plan_node(manifest, name, &mut stack)?;
    Ok(WorkflowPlan { root })
}

fn plan_node<'a>(
    manifest: &'a Manifest,
    name: &'a str,
    stack: &mut Vec<&'a str>,
) -> CoreResult<PlanNode> {
    if stack.contains(&name) {
        let mut cycle: Vec<&str> = stack.clone();
        cycle.push(name);
        return Err(invalid_input(&format!(
            "workflow references form a cycle: {}",
            cycle.join(" -> ")
        )));
    }

    let workflow = manifest
        .workflow(name)
        .ok_or_else(|| invalid_input(&format!("workflow `{name}` is not declared")))?;

    stack.push(name);
    let mut nodes = Vec::with_capacity(workflow.tasks.len());
    for task in &workflow.tasks {
        let args = task
            .args
            .as_deref()
            .map(str::trim)
            .filter(|args| !args.is_empty());
        let node = match &task.task {
            TaskKind::ShellExec => {
                let line = args.ok_or_else(|| {
                    invalid_input(&format!("shell.exec task in `{name}` has no args"))
                })?;
                let command = CommandSpec::shell(line).envs(&manifest.env);
                command.validate()?;
                PlanNode::Step(PlanStep::Shell {
                    workflow: name.to_string(),
                    command,
                    wait_for_port: task.wait_for_port,
                })
            }
            TaskKind::PackagerInstallForAll => PlanNode::Step(PlanStep::InstallPackages {
                workflow: name.to_string(),
            }),
            TaskKind::WorkflowRun => {
                let target = args.ok_or_else(|| {
                    invalid_input(&format!("workflow.run task in `{name}` has no args"))
                })?;
                plan_node(manifest, target, stack)?
            }
            TaskKind::Other(kind) => {
                tracing::warn!(
                    workflow = name,
                    task = %kind,
                    "planning unknown task kind as unsupported"
                );
                PlanNode::Step(PlanStep::Unsupported {
                    workflow: name.to_string(),
                    task: task.task.clone(),
                    args: task.args.clone(),
                })
            }
        };
        nodes.push(node);
    }
    stack.pop();

    Ok(PlanNode::Group {
        workflow: name.to_string(),
        mode: workflow.effective_mode(),
        nodes,
    })
}

/// The deployment run command with the manifest's `[env]` applied.
pub fn deployment_command(manifest: &Manifest) -> CoreResult<Option<CommandSpec>> {
    let Some(run) = manifest.deployment_run() else {
        return Ok(None);
    };

    let command = CommandSpec::from_run_command(run)?.envs(&manifest.env);
    command.validate()?;
    Ok(Some(command))
}

fn invalid_input(message: &str) -> CoreError {
    CoreError::new(CoreErrorKind::InvalidInput, message)
}
