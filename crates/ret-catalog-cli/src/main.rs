// crates/ret-catalog-cli/src/main.rs
// ============================================================================
// Module: Retriever Catalog CLI Entry Point
// Description: Command dispatcher for catalog inspection workflows.
// Purpose: Load, specialize, and print retriever configurations from SQLite.
// Dependencies: clap, ret-catalog-core, ret-catalog-store-sqlite, serde,
//               thiserror, toml
// ============================================================================

//! ## Overview
//! The retriever catalog CLI loads a process's configuration graph from a
//! `SQLite` catalog, optionally specializes it to a deployment site and
//! facility, and prints the inspection report. The `validate` command runs
//! the same pipeline and reports only the outcome, for use in scripts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use ret_catalog_core::LoadError;
use ret_catalog_core::LocationError;
use ret_catalog_core::ModelError;
use ret_catalog_core::ProcessKey;
use ret_catalog_core::RetrieverConfig;
use ret_catalog_core::load_retriever;
use ret_catalog_core::render_retriever;
use ret_catalog_core::set_location;
use ret_catalog_store_sqlite::SqliteCatalogSource;
use ret_catalog_store_sqlite::SqliteSourceConfig;
use ret_catalog_store_sqlite::SqliteSourceError;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Top-level argument parser.
#[derive(Parser, Debug)]
#[command(name = "ret-catalog", version, about = "Retriever catalog inspection tool")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a retriever configuration and print the inspection report.
    Show(ShowArgs),
    /// Load a retriever configuration and report whether it is valid.
    Validate(ShowArgs),
}

/// Arguments shared by the `show` and `validate` commands.
#[derive(Args, Debug)]
struct ShowArgs {
    /// Path to the `SQLite` catalog file.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Path to a TOML file with catalog source settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Process type, for example VAP.
    #[arg(long = "proc-type", value_name = "TYPE")]
    proc_type: String,
    /// Process name.
    #[arg(long = "proc-name", value_name = "NAME")]
    proc_name: String,
    /// Deployment site to specialize to. Requires --facility.
    #[arg(long, value_name = "SITE", requires = "facility")]
    site: Option<String>,
    /// Deployment facility to specialize to. Requires --site.
    #[arg(long, value_name = "FACILITY", requires = "site")]
    facility: Option<String>,
}

// ============================================================================
// SECTION: Config File
// ============================================================================

/// TOML configuration file layout.
#[derive(Debug, Deserialize)]
struct FileConfig {
    /// Catalog source settings.
    catalog: SqliteSourceConfig,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI errors surfaced on stderr.
#[derive(Debug, Error)]
enum CliError {
    /// No catalog location was provided.
    #[error("either --db or --config is required")]
    MissingCatalog,
    /// Configuration file could not be read.
    #[error("could not read config file {path}: {message}")]
    ConfigRead {
        /// Config file path.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Configuration file could not be parsed.
    #[error("could not parse config file {path}: {message}")]
    ConfigParse {
        /// Config file path.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Catalog source error.
    #[error(transparent)]
    Source(#[from] SqliteSourceError),
    /// Graph loading error.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Graph invariant violation.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Location specialization error.
    #[error(transparent)]
    Location(#[from] LocationError),
    /// Output stream error.
    #[error("could not write to {stream}: {message}")]
    Output {
        /// Output stream name.
        stream: &'static str,
        /// Underlying error message.
        message: String,
    },
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Show(args) => command_show(&args),
        Commands::Validate(args) => command_validate(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs the `show` command.
///
/// When specialization removes required variables, the report is still
/// printed so the surviving graph can be inspected, and the process exits
/// with a failure status.
fn command_show(args: &ShowArgs) -> CliResult<ExitCode> {
    let (config, location_result) = load_and_specialize(args)?;

    write_stdout(&render_retriever(&config))
        .map_err(|err| output_error("stdout", &err))?;

    match location_result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => Ok(emit_error(&err.to_string())),
    }
}

/// Runs the `validate` command.
///
/// An empty catalog is not an error; it is reported as such so scripts can
/// tell "nothing configured" apart from "configured and valid".
fn command_validate(args: &ShowArgs) -> CliResult<ExitCode> {
    let (config, location_result) = load_and_specialize(args)?;
    location_result?;
    config.validate()?;
    let message = if config.is_empty() {
        format!("no retriever information found for {}", config.process)
    } else {
        format!("retriever configuration for {} is valid", config.process)
    };
    write_stdout_line(&message).map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the configuration and applies the optional location.
///
/// Location failures other than [`LocationError::MissingLocation`] leave the
/// graph specialized, so they are returned alongside the configuration
/// instead of discarding it.
fn load_and_specialize(
    args: &ShowArgs,
) -> CliResult<(RetrieverConfig, Result<(), LocationError>)> {
    let source_config = resolve_source_config(args)?;
    let source = SqliteCatalogSource::open(&source_config)?;
    let process = ProcessKey::new(args.proc_type.clone(), args.proc_name.clone());
    let loaded = load_retriever(&source, &process)?;
    let mut config = loaded.config;

    let location_result = match (&args.site, &args.facility) {
        (Some(site), Some(facility)) => set_location(&mut config, site, facility),
        _ => Ok(()),
    };
    if matches!(location_result, Err(LocationError::MissingLocation)) {
        return Err(CliError::Location(LocationError::MissingLocation));
    }

    Ok((config, location_result))
}

/// Resolves the catalog source configuration from the arguments.
fn resolve_source_config(args: &ShowArgs) -> CliResult<SqliteSourceConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|err| CliError::ConfigRead {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            let file: FileConfig = toml::from_str(&text).map_err(|err| CliError::ConfigParse {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            file.catalog
        }
        None => {
            let Some(db) = &args.db else {
                return Err(CliError::MissingCatalog);
            };
            SqliteSourceConfig::new(db.clone())
        }
    };
    if let Some(db) = &args.db {
        config.path.clone_from(db);
    }
    Ok(config)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a string to stdout.
fn write_stdout(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(message.as_bytes())
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Wraps an output stream failure.
fn output_error(stream: &'static str, error: &std::io::Error) -> CliError {
    CliError::Output {
        stream,
        message: error.to_string(),
    }
}

/// Writes an error to stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
