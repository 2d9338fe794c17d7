//! Command-line surface of the `berth` binary.
//!
//! ```bash
//! berth check
//! berth check path/to/.replit --format json --deny-warnings
//! berth show --format json
//! berth fmt --check
//! berth ports --probe --timeout-ms 250
//! berth plan --workflow "Streamlit Server"
//! berth fingerprint
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "berth",
    version,
    about = "Inspect, validate and normalize hosted-environment manifests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a manifest and report diagnostics
    Check(CheckArgs),
    /// Print the normalized manifest
    Show(ShowArgs),
    /// Rewrite a manifest in normalized form
    Fmt(FmtArgs),
    /// List port mappings, optionally probing the local side
    Ports(PortsArgs),
    /// Show the steps a workflow resolves to
    Plan(PlanArgs),
    /// Print the manifest content fingerprint
    Fingerprint(ManifestArg),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ManifestArg {
    /// Manifest path (defaults to $BERTH_MANIFEST, then `.replit`)
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Treat warnings as failures
    #[arg(long)]
    pub deny_warnings: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct FmtArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Exit non-zero instead of rewriting when the file is not normalized
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Args)]
pub struct PortsArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Try a TCP connection to each local port
    #[arg(long)]
    pub probe: bool,

    /// Host to probe (defaults to $BERTH_PROBE_HOST, then 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Per-port connect timeout (defaults to $BERTH_PROBE_TIMEOUT_MS, then 500)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// Workflow to plan instead of the run button
    #[arg(long)]
    pub workflow: Option<String>,
}

pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
