use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::models::{
    Diagnostic, DiagnosticCode, Manifest, RunCommand, Severity, TaskKind, Workflow, WorkflowTask,
};
use crate::registry;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.code == code)
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

pub fn validate(manifest: &Manifest) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_entrypoint(manifest, &mut report);
    check_modules(manifest, &mut report);
    check_nix(manifest, &mut report);
    check_deployment(manifest, &mut report);
    check_ports(manifest, &mut report);
    check_workflows(manifest, &mut report);

    tracing::debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "validated manifest"
    );
    report
}

fn check_entrypoint(manifest: &Manifest, report: &mut ValidationReport) {
    let Some(entrypoint) = manifest.entrypoint.as_deref() else {
        return;
    };

    if entrypoint.trim().is_empty() {
        report.push(Diagnostic::warning(
            DiagnosticCode::EntrypointBlank,
            "entrypoint",
            "entrypoint is blank",
        ));
    } else if Path::new(entrypoint).is_absolute() {
        report.push(Diagnostic::warning(
            DiagnosticCode::EntrypointAbsolute,
            "entrypoint",
            format!("entrypoint `{entrypoint}` should be relative to the project root"),
        ));
    }
}

fn check_modules(manifest: &Manifest, report: &mut ValidationReport) {
    for (index, module) in manifest.modules.iter().enumerate() {
        if module.trim().is_empty() {
            report.push(Diagnostic::warning(
                DiagnosticCode::ModuleBlank,
                format!("modules[{index}]"),
                "module identifier is blank",
            ));
        }
    }
}

fn check_nix(manifest: &Manifest, report: &mut ValidationReport) {
    let Some(nix) = manifest.nix.as_ref() else {
        return;
    };

    let mut seen = HashSet::new();
    for (index, package) in nix.packages.iter().enumerate() {
        let location = format!("nix.packages[{index}]");
        if package.trim().is_empty() {
            report.push(Diagnostic::error(
                DiagnosticCode::NixPackageBlank,
                location,
                "package name is blank",
            ));
        } else if !seen.insert(package.as_str()) {
            report.push(Diagnostic::warning(
                DiagnosticCode::NixPackageDuplicate,
                location,
                format!("package `{package}` is listed more than once"),
            ));
        }
    }
}

fn check_deployment(manifest: &Manifest, report: &mut ValidationReport) {
    let Some(deployment) = manifest.deployment.as_ref() else {
        return;
    };

    if let Some(run) = deployment.run.as_ref() {
        check_command(run, "deployment.run", report);
    }
    if let Some(build) = deployment.build.as_ref() {
        check_command(build, "deployment.build", report);
    }

    if let Some(target) = deployment.deployment_target.as_ref()
        && registry::deployment_target(target).is_none()
    {
        report.push(Diagnostic::warning(
            DiagnosticCode::DeploymentTargetUnknown,
            "deployment.deploymentTarget",
            format!("unknown deployment target `{}`", target.as_str()),
        ));
    }
}

fn check_command(command: &RunCommand, location: &str, report: &mut ValidationReport) {
    if command.is_empty() {
        report.push(Diagnostic::error(
            DiagnosticCode::DeploymentRunEmpty,
            location,
            "command must not be empty",
        ));
        return;
    }

    if let RunCommand::Argv(argv) = command
        && argv.first().is_some_and(|program| program.trim().is_empty())
    {
        report.push(Diagnostic::error(
            DiagnosticCode::DeploymentProgramBlank,
            format!("{location}[0]"),
            "command program must not be blank",
        ));
    }
}

fn check_ports(manifest: &Manifest, report: &mut ValidationReport) {
    let mut local_seen: HashMap<u16, usize> = HashMap::new();
    let mut external_seen: HashMap<u16, usize> = HashMap::new();

    for (index, mapping) in manifest.ports.iter().enumerate() {
        if mapping.local_port == 0 {
            report.push(Diagnostic::error(
                DiagnosticCode::PortZero,
                format!("ports[{index}].localPort"),
                "local port must be a positive integer",
            ));
        } else if let Some(first) = local_seen.insert(mapping.local_port, index) {
            report.push(Diagnostic::error(
                DiagnosticCode::LocalPortDuplicate,
                format!("ports[{index}].localPort"),
                format!(
                    "local port {} is already mapped by ports[{first}]",
                    mapping.local_port
                ),
            ));
        }

        if mapping.external_port == 0 {
            report.push(Diagnostic::error(
                DiagnosticCode::PortZero,
                format!("ports[{index}].externalPort"),
                "external port must be a positive integer",
            ));
            continue;
        }

        if let Some(first) = external_seen.insert(mapping.external_port, index) {
            report.push(Diagnostic::error(
                DiagnosticCode::ExternalPortDuplicate,
                format!("ports[{index}].externalPort"),
                format!(
                    "external port {} is already used by ports[{first}]",
                    mapping.external_port
                ),
            ));
        }

        if !registry::is_routable_external_port(mapping.external_port) {
            report.push(Diagnostic::warning(
                DiagnosticCode::ExternalPortUnroutable,
                format!("ports[{index}].externalPort"),
                format!(
                    "external port {} is not routed by the platform",
                    mapping.external_port
                ),
            ));
        }
    }
}

fn check_workflows(manifest: &Manifest, report: &mut ValidationReport) {
    let Some(workflows) = manifest.workflows.as_ref() else {
        return;
    };

    let mut by_name: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, workflow) in workflows.workflow.iter().enumerate() {
        let location = format!("workflows.workflow[{index}]");
        if workflow.name.trim().is_empty() {
            report.push(Diagnostic::error(
                DiagnosticCode::WorkflowNameBlank,
                format!("{location}.name"),
                "workflow name is blank",
            ));
        } else if let Some(first) = by_name.get(workflow.name.as_str()) {
            report.push(Diagnostic::error(
                DiagnosticCode::WorkflowNameDuplicate,
                format!("{location}.name"),
                format!(
                    "workflow `{}` is already declared by workflows.workflow[{first}]",
                    workflow.name
                ),
            ));
        } else {
            by_name.insert(workflow.name.as_str(), index);
        }

        if workflow.tasks.is_empty() {
            report.push(Diagnostic::warning(
                DiagnosticCode::WorkflowEmpty,
                location.clone(),
                format!("workflow `{}` has no tasks", workflow.name),
            ));
        }

        for (task_index, task) in workflow.tasks.iter().enumerate() {
            let task_location = format!("{location}.tasks[{task_index}]");
            check_task(manifest, task, &task_location, report);
        }
    }

    match workflows.run_button.as_deref() {
        Some(run_button) if !by_name.contains_key(run_button) => {
            report.push(Diagnostic::error(
                DiagnosticCode::RunButtonUnknown,
                "workflows.runButton",
                format!("run button names undeclared workflow `{run_button}`"),
            ));
        }
        None if !workflows.workflow.is_empty() => {
            report.push(Diagnostic::warning(
                DiagnosticCode::RunButtonMissing,
                "workflows.runButton",
                "workflows are declared but no run button is set",
            ));
        }
        _ => {}
    }

    for cycle in workflow_cycles(&workflows.workflow) {
        report.push(Diagnostic::error(
            DiagnosticCode::WorkflowCycle,
            "workflows.workflow",
            format!("workflow references form a cycle: {}", cycle.join(" -> ")),
        ));
    }
}

fn check_task(
    manifest: &Manifest,
    task: &WorkflowTask,
    location: &str,
    report: &mut ValidationReport,
) {
    let args = task.args.as_deref().map(str::trim).unwrap_or("");

    match registry::task_kind(&task.task) {
        None => report.push(Diagnostic::warning(
            DiagnosticCode::TaskKindUnknown,
            format!("{location}.task"),
            format!("unknown task kind `{}`", task.task),
        )),
        Some(descriptor) if descriptor.requires_args && args.is_empty() => {
            report.push(Diagnostic::error(
                DiagnosticCode::TaskArgsMissing,
                format!("{location}.args"),
                format!("`{}` tasks require args", descriptor.id),
            ));
        }
        Some(_) => {}
    }

    if task.task == TaskKind::WorkflowRun && !args.is_empty() && manifest.workflow(args).is_none()
    {
        report.push(Diagnostic::error(
            DiagnosticCode::TaskWorkflowUnknown,
            format!("{location}.args"),
            format!("task runs undeclared workflow `{args}`"),
        ));
    }

    if let Some(port) = task.wait_for_port
        && manifest.port_for_local(port).is_none()
    {
        report.push(Diagnostic::warning(
            DiagnosticCode::WaitForPortUndeclared,
            format!("{location}.waitForPort"),
            format!("task waits for port {port}, which no port mapping declares"),
        ));
    }
}

/// Returns at least one cycle for every strongly connected component of the
/// `workflow.run` reference graph that contains one. This is not every
/// elementary cycle: edges into an already finished workflow are not walked
/// again. Each cycle is rotated to start at its lexicographically smallest
/// workflow name and closes by repeating that name.
pub(crate) fn workflow_cycles(workflows: &[Workflow]) -> Vec<Vec<String>> {
    let edges: BTreeMap<&str, Vec<&str>> = workflows
        .iter()
        .map(|workflow| (workflow.name.as_str(), workflow_references(workflow)))
        .collect();

    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut done: HashSet<&str> = HashSet::new();

    for start in edges.keys() {
        let mut stack: Vec<&str> = Vec::new();
        visit(start, &edges, &mut stack, &mut done, &mut cycles);
    }

    cycles
}

fn visit<'a>(
    node: &'a str,
    edges: &BTreeMap<&'a str, Vec<&'a str>>,
    stack: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    if done.contains(node) {
        return;
    }

    if let Some(position) = stack.iter().position(|entry| *entry == node) {
        let mut cycle: Vec<String> = stack[position..].iter().map(|s| s.to_string()).collect();
        if let Some(min_index) = cycle
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(index, _)| index)
        {
            cycle.rotate_left(min_index);
        }
        let first = cycle[0].clone();
        cycle.push(first);
        if !cycles.contains(&cycle) {
            cycles.push(cycle);
        }
        return;
    }

    stack.push(node);
    if let Some(targets) = edges.get(node) {
        for target in targets {
            if edges.contains_key(target) {
                visit(target, edges, stack, done, cycles);
            }
        }
    }
    stack.pop();
    done.insert(node);
}

fn workflow_references(workflow: &Workflow) -> Vec<&str> {
    workflow
        .tasks
        .iter()
        .filter(|task| task.task == TaskKind::WorkflowRun)
        .filter_map(|task| task.args.as_deref().map(str::trim))
        .filter(|name| !name.is_empty())
        .collect()
}
