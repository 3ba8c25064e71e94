use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use rectypes_core::{Definitions, TypeHandle, TypeRegistry};
use tracing::debug;

use crate::exit::{definition_error, io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod schema;
pub mod types;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the record types declared in a definitions file.
    Types(TypesArgs),
    /// Print the JSON Schema derived for a record type.
    Schema(SchemaArgs),
    /// Validate an instance document against a record type.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Types(args) => types::run(args, format),
        Command::Schema(args) => schema::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Definitions file (JSON).
    pub definitions: PathBuf,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Definitions file (JSON).
    pub definitions: PathBuf,
    /// Record type to derive.
    pub type_name: String,
    /// Reject properties that are not declared fields.
    #[arg(long)]
    pub strict: bool,
    /// Include type names as schema titles.
    #[arg(long)]
    pub titles: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Definitions file (JSON).
    pub definitions: PathBuf,
    /// Record type the instance must satisfy.
    pub type_name: String,
    /// Instance file (JSON), or `-` for stdin.
    pub instance: String,
    /// Also validate against the derived JSON Schema before decoding.
    #[arg(long)]
    pub schema: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a definitions file and register everything it declares.
pub(crate) fn load_registry(path: &Path) -> CliResult<TypeRegistry> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
    let definitions = Definitions::from_json(&text).map_err(|err| {
        CliError::new(USAGE, format!("parse {}: {err}", path.display()))
    })?;

    let mut registry = TypeRegistry::new();
    definitions
        .load(&mut registry)
        .map_err(|err| definition_error(&format!("load {}", path.display()), err))?;
    debug!(path = %path.display(), types = registry.len(), "definitions loaded");
    Ok(registry)
}

pub(crate) fn lookup_type<'a>(registry: &'a TypeRegistry, name: &str) -> CliResult<&'a TypeHandle> {
    registry
        .get(name)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown record type: {name}")))
}
