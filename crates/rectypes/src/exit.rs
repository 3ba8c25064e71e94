use std::fmt;
use std::io;

use rectypes_core::{CodecError, DefinitionError};
use rectypes_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => USAGE,
        _ => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

/// A definitions document that cannot be turned into types is a usage error.
pub fn definition_error(context: &str, err: DefinitionError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    match err {
        SchemaError::ValidationFailed { .. } | SchemaError::InvalidJson(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SchemaError::Unresolved(_) | SchemaError::NoSchema(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
