use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use berth_core::codec::{self, ManifestFormat};
use berth_core::fingerprint::fingerprint;
use berth_core::models::{Diagnostic, Manifest, WorkflowMode};
use berth_core::plan::{PlanNode, PlanStep, deployment_command, plan_workflow};
use berth_core::probe::{PortProbe, ProbeOptions, ProbeStatus, probe_ports};
use berth_core::source::{self, FsManifestSource, ManifestSource};
use berth_core::validation::validate;
use serde::Serialize;

use crate::cli::{
    CheckArgs, Command, FmtArgs, ManifestArg, OutputFormat, PlanArgs, PortsArgs, ReportFormat,
    ShowArgs,
};
use crate::config::CliConfig;

pub const EXIT_FINDINGS: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;

/// How a command that ran to completion ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Clean,
    /// Validation errors, denied warnings or formatting drift.
    Findings,
}

/// 0 clean, 1 findings, 2 when the command could not run at all.
pub fn exit_code(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Clean) => 0,
        Ok(Outcome::Findings) => EXIT_FINDINGS,
        Err(_) => EXIT_FAILURE,
    }
}

pub fn run(config: &CliConfig, command: &Command, out: &mut dyn Write) -> Result<Outcome> {
    match command {
        Command::Check(args) => check(config, args, out),
        Command::Show(args) => show(config, args, out),
        Command::Fmt(args) => fmt(config, args, out),
        Command::Ports(args) => ports(config, args, out),
        Command::Plan(args) => plan(config, args, out),
        Command::Fingerprint(arg) => fingerprint_manifest(config, arg, out),
    }
}

struct Loaded {
    path: PathBuf,
    format: ManifestFormat,
    text: String,
    manifest: Manifest,
}

fn load(config: &CliConfig, arg: &ManifestArg) -> Result<Loaded> {
    let path = config.manifest_path(arg.manifest.as_ref());
    let source = FsManifestSource::new(&path);
    let format = source.format();

    let text = source
        .read()
        .with_context(|| format!("cannot read {}", path.display()))?;
    let manifest = codec::parse(&text, format)
        .map_err(|error| error.with_origin(&path))
        .with_context(|| format!("cannot parse {}", path.display()))?;

    tracing::debug!(path = %path.display(), "manifest loaded");
    Ok(Loaded {
        path,
        format,
        text,
        manifest,
    })
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    manifest: &'a Path,
    errors: usize,
    warnings: usize,
    diagnostics: &'a [Diagnostic],
}

pub fn check(config: &CliConfig, args: &CheckArgs, out: &mut dyn Write) -> Result<Outcome> {
    let loaded = load(config, &args.manifest)?;
    let report = validate(&loaded.manifest);
    let errors = report.errors().count();
    let warnings = report.warnings().count();

    match args.format {
        ReportFormat::Text => {
            for diagnostic in &report.diagnostics {
                writeln!(out, "{}: {diagnostic}", loaded.path.display())?;
            }
            writeln!(
                out,
                "{}: {errors} error(s), {warnings} warning(s)",
                loaded.path.display()
            )?;
        }
        ReportFormat::Json => {
            let output = CheckOutput {
                manifest: &loaded.path,
                errors,
                warnings,
                diagnostics: &report.diagnostics,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
    }

    let failed = errors > 0 || (args.deny_warnings && warnings > 0);
    Ok(if failed {
        Outcome::Findings
    } else {
        Outcome::Clean
    })
}

pub fn show(config: &CliConfig, args: &ShowArgs, out: &mut dyn Write) -> Result<Outcome> {
    let loaded = load(config, &args.manifest)?;
    let format = match args.format {
        OutputFormat::Toml => ManifestFormat::Toml,
        OutputFormat::Json => ManifestFormat::Json,
    };
    write!(out, "{}", codec::render(&loaded.manifest, format)?)?;
    Ok(Outcome::Clean)
}

pub fn fmt(config: &CliConfig, args: &FmtArgs, out: &mut dyn Write) -> Result<Outcome> {
    let loaded = load(config, &args.manifest)?;
    let normalized = codec::render(&loaded.manifest, loaded.format)?;

    if normalized == loaded.text {
        return Ok(Outcome::Clean);
    }

    if args.check {
        writeln!(out, "{}: not normalized", loaded.path.display())?;
        return Ok(Outcome::Findings);
    }

    source::write_atomically(&loaded.path, &normalized)
        .with_context(|| format!("cannot rewrite {}", loaded.path.display()))?;
    tracing::info!(path = %loaded.path.display(), "rewrote manifest");
    writeln!(out, "{}: normalized", loaded.path.display())?;
    Ok(Outcome::Clean)
}

pub fn ports(config: &CliConfig, args: &PortsArgs, out: &mut dyn Write) -> Result<Outcome> {
    let loaded = load(config, &args.manifest)?;
    let mappings = &loaded.manifest.ports;

    if !args.probe {
        match args.format {
            ReportFormat::Text => {
                for mapping in mappings {
                    writeln!(
                        out,
                        "{:>5} -> {:<5}",
                        mapping.local_port, mapping.external_port
                    )?;
                }
            }
            ReportFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(mappings)?)?,
        }
        return Ok(Outcome::Clean);
    }

    let options = ProbeOptions {
        host: args
            .host
            .clone()
            .unwrap_or_else(|| config.probe_host.clone()),
        timeout: args
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(config.probe_timeout),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    let probes = runtime.block_on(probe_ports(mappings, &options))?;

    match args.format {
        ReportFormat::Text => {
            for probe in &probes {
                writeln!(
                    out,
                    "{:>5} -> {:<5} {}",
                    probe.mapping.local_port,
                    probe.mapping.external_port,
                    describe_probe(probe)
                )?;
            }
        }
        ReportFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&probes)?)?,
    }

    Ok(Outcome::Clean)
}

fn describe_probe(probe: &PortProbe) -> String {
    match &probe.status {
        ProbeStatus::Listening => format!("listening ({}ms)", probe.elapsed_ms),
        ProbeStatus::Refused => "closed".to_string(),
        ProbeStatus::TimedOut => "timed out".to_string(),
        ProbeStatus::Failed(reason) => format!("error: {reason}"),
    }
}

pub fn plan(config: &CliConfig, args: &PlanArgs, out: &mut dyn Write) -> Result<Outcome> {
    let loaded = load(config, &args.manifest)?;

    // A broken deployment command is reported but does not block planning.
    match deployment_command(&loaded.manifest) {
        Ok(Some(command)) => {
            let target = loaded
                .manifest
                .deployment_target()
                .map(|target| target.as_str().to_string())
                .unwrap_or_else(|| "unspecified".to_string());
            writeln!(out, "deployment ({target}): {}", command.display())?;
        }
        Ok(None) => {}
        Err(error) => {
            tracing::debug!(error = %error, "deployment command is invalid");
            writeln!(out, "deployment: invalid ({})", error.message)?;
        }
    }

    if args.workflow.is_none() && loaded.manifest.run_button().is_none() {
        return Ok(Outcome::Clean);
    }

    let plan = plan_workflow(&loaded.manifest, args.workflow.as_deref())?;
    let mut lines = Vec::new();
    render_node(&plan.root, 0, &mut lines);
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(Outcome::Clean)
}

fn render_node(node: &PlanNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        PlanNode::Group {
            workflow,
            mode,
            nodes,
        } => {
            let mode = match mode {
                WorkflowMode::Sequential => "sequential",
                WorkflowMode::Parallel => "parallel",
            };
            lines.push(format!("{indent}workflow {workflow:?} ({mode})"));
            for child in nodes {
                render_node(child, depth + 1, lines);
            }
        }
        PlanNode::Step(PlanStep::Shell {
            command,
            wait_for_port,
            ..
        }) => {
            let wait = wait_for_port
                .map(|port| format!(" [waits for :{port}]"))
                .unwrap_or_default();
            lines.push(format!("{indent}run {}{wait}", command.display()));
        }
        PlanNode::Step(PlanStep::InstallPackages { .. }) => {
            lines.push(format!("{indent}install packages"));
        }
        PlanNode::Step(PlanStep::Unsupported { task, args, .. }) => {
            lines.push(format!(
                "{indent}unsupported {task} {}",
                args.as_deref().unwrap_or("")
            ));
        }
    }
}

pub fn fingerprint_manifest(
    config: &CliConfig,
    arg: &ManifestArg,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let loaded = load(config, arg)?;
    writeln!(out, "{}", fingerprint(&loaded.manifest)?)?;
    Ok(Outcome::Clean)
}
