//! tdt2rs CLI
//!
//! Generates Rust structures from TOSCA data type definitions.
//!
//! Usage:
//!   tdt2rs normative.yaml -f src/datatypes.rs --builtin-types
//!   tdt2rs normative.yaml --name-mapping 'tosca\.datatypes\.(.+)=Tosca_${1}'
//!   tdt2rs normative.yaml -f src/datatypes.rs --check

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tdt2rs::{drift, EmitFormat, NameMapping, Options, OutputTarget, Tdt2rsConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tdt2rs")]
#[command(about = "Generate Rust structures from TOSCA data type definitions")]
struct Cli {
    /// TOSCA definition file
    tosca_file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Module name for the generated header (default: output file stem or current crate)
    #[arg(short, long)]
    package: Option<String>,

    /// Only generate data types matching this regex (repeatable, wins over --exclude)
    #[arg(long = "include", value_name = "REGEX")]
    include: Vec<String>,

    /// Skip data types matching this regex (repeatable)
    #[arg(long = "exclude", value_name = "REGEX")]
    exclude: Vec<String>,

    /// Rename data types, applied in the given order (repeatable)
    #[arg(
        long = "name-mapping",
        value_name = "PATTERN=REPLACEMENT",
        value_parser = NameMapping::parse_pair
    )]
    name_mappings: Vec<NameMapping>,

    /// Also generate TOSCA builtin types (Range, ScalarUnit..., Version)
    #[arg(long)]
    builtin_types: bool,

    /// Configuration file (merged over tdt2rs.toml and TDT2RS_* variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to emit: rust or model (intermediate JSON)
    #[arg(long, default_value = "rust")]
    emit: EmitFormat,

    /// Compare with the existing output file instead of writing it
    #[arg(long, requires = "file")]
    check: bool,
}

impl Cli {
    /// Command-line flags override configuration values
    fn options(&self, config: Tdt2rsConfig) -> Options {
        let mut options = config.into_options();
        if let Some(ref package) = self.package {
            options.package = Some(package.clone());
        }
        if let Some(ref file) = self.file {
            options.output = OutputTarget::File(file.clone());
        }
        if !self.include.is_empty() {
            options.include_patterns = self.include.clone();
        }
        if !self.exclude.is_empty() {
            options.exclude_patterns = self.exclude.clone();
        }
        if !self.name_mappings.is_empty() {
            options.name_mappings = self.name_mappings.clone();
        }
        if self.builtin_types {
            options.generate_builtin_types = true;
        }
        options
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when `--check` found drift
fn run(cli: Cli) -> Result<bool> {
    let config = Tdt2rsConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let options = cli.options(config);
    debug!(?options, "Resolved options");

    let file = tdt2rs::build_file(&cli.tosca_file, &options)
        .with_context(|| format!("Failed to generate from {}", cli.tosca_file.display()))?;
    let rendered = tdt2rs::render_file(&file, cli.emit)?;

    if cli.check {
        return check(&options.output, &rendered);
    }

    tdt2rs::write_output(&options.output, &rendered)?;
    if let Some(path) = options.output.path() {
        eprintln!("Generated {} data types into {}", file.data_types.len(), path.display());
    }
    Ok(true)
}

fn check(output: &OutputTarget, rendered: &[u8]) -> Result<bool> {
    let Some(path) = output.path() else {
        bail!("--check needs an output file");
    };
    let current = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    let generated = String::from_utf8_lossy(rendered);

    match drift::detect(&current, &generated, &path.display().to_string()) {
        None => {
            eprintln!("{} is up to date", path.display());
            Ok(true)
        }
        Some(report) => {
            print!("{}", report.diff);
            eprintln!("{} is stale: {}", path.display(), report.summary());
            Ok(false)
        }
    }
}
