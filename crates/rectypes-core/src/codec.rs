//! Textual encoding of records.
//!
//! Records encode as JSON objects with keys in field-table order. Decoding is
//! split in two: [`deserialize`] recovers the raw field map, and
//! [`decode_record`] converts a raw object into a validated [`Record`] using
//! the type's field table as a guide.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::constraint::{Constraint, PrimitiveKind};
use crate::error::{CodecError, TypeError};
use crate::record::{Record, TypeHandle};
use crate::value::{FieldValues, Value};

/// Raw field map recovered from record text.
pub type RawFields = Map<String, JsonValue>;

/// Encode a record as compact JSON.
pub fn serialize(record: &Record) -> Result<String, CodecError> {
    Ok(serde_json::to_string(record)?)
}

/// Encode a record as indented JSON.
pub fn serialize_pretty(record: &Record) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Parse record text back into its raw field map.
pub fn deserialize(text: &str) -> Result<RawFields, CodecError> {
    match serde_json::from_str::<JsonValue>(text)? {
        JsonValue::Object(fields) => Ok(fields),
        other => Err(CodecError::NotAnObject(json_kind(&other))),
    }
}

impl Record {
    /// The raw field map this record serializes to.
    pub fn to_raw(&self) -> RawFields {
        self.iter()
            .map(|(name, value)| (name.to_string(), to_json(value)))
            .collect()
    }
}

/// Convert a raw JSON object into a validated instance of `record_type`.
///
/// Arrays become lists, sets or tuples as the field's constraint asks, backing
/// values become enum members and nested objects are constructed through
/// their own type. Values that cannot be converted are passed through as-is
/// so that construction reports them.
pub fn decode_record(record_type: &TypeHandle, raw: &JsonValue) -> Result<Record, CodecError> {
    let JsonValue::Object(fields) = raw else {
        return Err(CodecError::NotAnObject(json_kind(raw)));
    };

    let mut values = FieldValues::new();
    for (name, raw_value) in fields {
        let Some(constraint) = record_type.fields().get(name) else {
            return Err(TypeError::UnknownField {
                type_name: record_type.name().to_string(),
                field: name.clone(),
            }
            .into());
        };
        values.insert(name.clone(), decode_value(name, constraint, raw_value)?);
    }

    Ok(record_type.construct(values)?)
}

fn decode_value(field: &str, constraint: &Constraint, raw: &JsonValue) -> Result<Value, CodecError> {
    match (constraint, raw) {
        (Constraint::Described { inner, .. }, _) => decode_value(field, inner, raw),
        (Constraint::Optional(_), JsonValue::Null) => Ok(Value::Null),
        (Constraint::Optional(inner), _) => decode_value(field, inner, raw),
        (Constraint::Primitive(kind), _) => decode_primitive(field, *kind, raw),
        (Constraint::Sequence { item, unique }, JsonValue::Array(items)) => {
            let items = items
                .iter()
                .map(|element| decode_value(field, item, element))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if *unique {
                Value::set(items)
            } else {
                Value::List(items)
            })
        }
        (Constraint::Tuple(positions), JsonValue::Array(items)) if positions.len() == items.len() => {
            let items = positions
                .iter()
                .zip(items)
                .map(|(position, element)| decode_value(field, position, element))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Tuple(items))
        }
        (Constraint::Enum(enum_type), _) => match enum_type.from_backing(raw) {
            Some(member) => Ok(Value::Enum(member)),
            None => untyped(field, raw),
        },
        (Constraint::Record(nested), JsonValue::Object(_)) => {
            Ok(Value::Record(Arc::new(decode_record(nested, raw)?)))
        }
        _ => untyped(field, raw),
    }
}

fn decode_primitive(field: &str, kind: PrimitiveKind, raw: &JsonValue) -> Result<Value, CodecError> {
    match (kind, raw) {
        (PrimitiveKind::Float, JsonValue::Number(n)) => match n.as_f64() {
            Some(v) => Ok(Value::Float(v)),
            None => untyped(field, raw),
        },
        (PrimitiveKind::Bytes, JsonValue::Array(items)) => {
            let bytes: Option<Vec<u8>> = items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            match bytes {
                Some(bytes) => Ok(Value::Bytes(bytes)),
                None => untyped(field, raw),
            }
        }
        (PrimitiveKind::Set, JsonValue::Array(items)) => {
            let items = items
                .iter()
                .map(|item| untyped(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::set(items))
        }
        (PrimitiveKind::Tuple, JsonValue::Array(items)) => {
            let items = items
                .iter()
                .map(|item| untyped(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Tuple(items))
        }
        _ => untyped(field, raw),
    }
}

/// Best-effort conversion with no constraint to guide it.
fn untyped(field: &str, raw: &JsonValue) -> Result<Value, CodecError> {
    match raw {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(v) => Ok(Value::Bool(*v)),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => Ok(Value::Int(v)),
            (None, Some(v)) => Ok(Value::Float(v)),
            (None, None) => Err(CodecError::Decode {
                field: field.to_string(),
                message: format!("number {n} is out of range"),
            }),
        },
        JsonValue::String(s) => Ok(Value::Str(s.clone())),
        JsonValue::Array(items) => Ok(Value::List(
            items
                .iter()
                .map(|item| untyped(field, item))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        JsonValue::Object(_) => Err(CodecError::Decode {
            field: field.to_string(),
            message: "object value where no record type is expected".to_string(),
        }),
    }
}

fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Int(v) => JsonValue::from(*v),
        Value::Float(v) => JsonValue::from(*v),
        Value::Str(v) => JsonValue::String(v.clone()),
        Value::Bytes(bytes) => bytes.iter().map(|b| JsonValue::from(*b)).collect(),
        Value::List(items) | Value::Set(items) | Value::Tuple(items) => {
            items.iter().map(to_json).collect()
        }
        Value::Enum(member) => member.backing().to_json(),
        Value::Record(record) => JsonValue::Object(record.to_raw()),
    }
}

fn json_kind(raw: &JsonValue) -> &'static str {
    match raw {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
