use jsonschema::{ValidationError, Validator};
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// At most this many schema violations are reported per instance.
const MAX_REPORTED: usize = 4;

pub(crate) fn validate_payload(type_name: &str, payload: &[u8], validator: &Validator) -> Result<()> {
    let value: Value = serde_json::from_slice(payload)?;
    validate_instance(type_name, &value, validator)
}

pub(crate) fn validate_instance(type_name: &str, value: &Value, validator: &Validator) -> Result<()> {
    let violations: Vec<String> = validator
        .iter_errors(value)
        .take(MAX_REPORTED)
        .map(|err| describe(&err))
        .collect();

    if violations.is_empty() {
        return Ok(());
    }
    Err(SchemaError::ValidationFailed {
        type_name: type_name.to_string(),
        message: violations.join("; "),
    })
}

/// Prefix a violation with the JSON pointer of the offending field.
fn describe(err: &ValidationError<'_>) -> String {
    match err.instance_path().as_str() {
        "" => err.to_string(),
        path => format!("{path}: {err}"),
    }
}
