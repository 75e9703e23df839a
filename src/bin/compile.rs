//! Schema Compiler CLI
//!
//! Compiles Avro schema files and prints their canonical form.
//!
//! Usage:
//!   avsc-compile schemas/                 # every *.avsc and *.json below a directory
//!   avsc-compile user.avsc --compact      # single-line output
//!   avsc-compile a.avsc --mode accumulate-all --fingerprint

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use avsc_compiler::{Compiler, CompilerConfig, ErrorMode, ErrorState, OutputFormat};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "avsc-compile")]
#[command(about = "Compile Avro schemas and print their canonical JSON")]
struct Cli {
    /// Schema files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Single-line output
    #[arg(long)]
    compact: bool,

    /// Error handling mode
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Print the SHA256 fingerprint of each schema
    #[arg(long)]
    fingerprint: bool,

    /// Only check, print nothing on success
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    FailFast,
    AccumulateAll,
}

impl From<ModeArg> for ErrorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::FailFast => ErrorMode::FailFast,
            ModeArg::AccumulateAll => ErrorMode::AccumulateAll,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one schema failed to compile.
fn run(cli: Cli) -> Result<bool> {
    let mut config =
        CompilerConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(mode) = cli.mode {
        config.compiler.mode = mode.into();
    }
    if cli.compact {
        config.output.format = OutputFormat::Compact;
    }
    if cli.fingerprint {
        config.output.fingerprint = true;
    }
    debug!(?config, "effective configuration");

    let compiler = Compiler::from_config(&config);
    let files = collect_inputs(&cli.inputs)?;
    info!(files = files.len(), "compiling schemas");

    let mut errors = ErrorState::new();
    let mut all_ok = true;

    for path in &files {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;

        match compiler.compile(&source, &mut errors) {
            Ok(schema) => {
                if cli.quiet {
                    continue;
                }
                if files.len() > 1 {
                    println!("// {}", path.display());
                }
                println!("{}", schema.to_json(config.output.format.is_pretty()));
                if config.output.fingerprint {
                    println!("// sha256: {}", schema.fingerprint());
                }
            }
            Err(e) => {
                all_ok = false;
                match e.diagnostics().len() {
                    0 => eprintln!("{}: {}", path.display(), e),
                    n => eprintln!("{}: {} error(s)", path.display(), n),
                }
                errors.drain(io::stderr()).context("writing diagnostics")?;
            }
        }
        // Successful compiles leave nothing behind; keep the next file's report clean.
        errors.discard();
    }

    Ok(all_ok)
}

/// Expand directories into their `*.avsc` and `*.json` files, sorted.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_schema_file(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", input.display());
        }
    }
    Ok(files)
}

fn is_schema_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("avsc") | Some("json")
    )
}
