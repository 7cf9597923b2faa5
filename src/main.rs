//! Command-line interface for the telnorm binary.
//!
//! The CLI exposes a subcommand for normalizing telemetry declaration
//! documents into their runtime component representation, printed as JSON on
//! standard output.

use std::{
    io,
    path::{Path, PathBuf},
    process
};

use clap::{ArgAction, Args, Parser, Subcommand};
use telnorm::{Error, NormalizedConfig, load_declaration};
use tracing_subscriber::EnvFilter;

/// Command line interface for normalizing telemetry declarations.
#[derive(Debug, Parser)]
#[command(name = "telnorm", version, about = "Normalize telemetry declarations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Legacy argument support for the default normalize command.
    #[command(flatten)]
    legacy: LegacyNormalizeArgs
}

/// Supported commands exposed by the CLI.
#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a declaration from a YAML or JSON document.
    Normalize(NormalizeArgs)
}

/// Arguments accepted by the `normalize` subcommand.
#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Path to the declaration document.
    #[arg(long = "config", value_name = "PATH")]
    config: PathBuf,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool
}

/// Arguments accepted when the CLI is invoked without a subcommand.
#[derive(Debug, Args, Default)]
struct LegacyNormalizeArgs {
    /// Path to the declaration document.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(error) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from declaration loading and normalization.
fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Normalize(args)) => run_normalize(args),
        None => run_legacy_normalize(&cli.legacy)
    }
}

fn run_normalize(args: NormalizeArgs) -> Result<(), Error> {
    run_normalize_from_path(&args.config, args.pretty)
}

fn run_normalize_from_path(path: &Path, pretty: bool) -> Result<(), Error> {
    let config = load_declaration(path)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_normalized_config(&mut handle, &config, pretty)
}

fn write_normalized_config<W: io::Write>(
    writer: &mut W,
    config: &NormalizedConfig,
    pretty: bool
) -> Result<(), Error> {
    if pretty {
        serde_json::to_writer_pretty(writer, config)?;
    } else {
        serde_json::to_writer(writer, config)?;
    }

    Ok(())
}

fn run_legacy_normalize(args: &LegacyNormalizeArgs) -> Result<(), Error> {
    let config = args
        .config
        .as_deref()
        .ok_or_else(|| Error::validation("missing required --config <PATH> argument"))?;

    run_normalize_from_path(config, args.pretty)
}
