//! The recursive type-checking predicate.

use crate::constraint::{Constraint, Pattern, PrimitiveKind};
use crate::value::Value;

/// Does `value` satisfy `constraint`?
///
/// Pure and total: constraint trees are finite, and forward references that
/// were never resolved are satisfied by nothing.
pub fn type_check(value: &Value, constraint: &Constraint) -> bool {
    match constraint {
        Constraint::Primitive(kind) => primitive_matches(value, *kind),
        Constraint::Optional(inner) => value.is_null() || type_check(value, inner),
        Constraint::Sequence { item, unique } => match (value, unique) {
            (Value::List(items), false) | (Value::Set(items), true) => {
                items.iter().all(|element| type_check(element, item))
            }
            _ => false,
        },
        Constraint::Tuple(positions) => match value {
            Value::Tuple(items) => {
                items.len() == positions.len()
                    && items
                        .iter()
                        .zip(positions)
                        .all(|(element, position)| type_check(element, position))
            }
            _ => false,
        },
        Constraint::Enum(enum_type) => {
            matches!(value, Value::Enum(member) if member.is_member_of(enum_type))
        }
        Constraint::Record(record_type) => {
            matches!(value, Value::Record(record) if record.is_instance_of(record_type))
        }
        Constraint::Described { inner, pattern, .. } => {
            type_check(value, inner) && pattern.as_ref().is_none_or(|p| pattern_matches(value, p))
        }
        Constraint::Forward(_) => false,
    }
}

fn primitive_matches(value: &Value, kind: PrimitiveKind) -> bool {
    matches!(
        (value, kind),
        (Value::Str(_), PrimitiveKind::String)
            | (Value::Bytes(_), PrimitiveKind::Bytes)
            | (Value::Int(_), PrimitiveKind::Integer)
            | (Value::Float(_), PrimitiveKind::Float)
            | (Value::Bool(_), PrimitiveKind::Boolean)
            | (Value::List(_), PrimitiveKind::List)
            | (Value::Set(_), PrimitiveKind::Set)
            | (Value::Tuple(_), PrimitiveKind::Tuple)
    )
}

fn pattern_matches(value: &Value, pattern: &Pattern) -> bool {
    match value {
        Value::Str(text) => pattern.full_match(text),
        Value::Bytes(bytes) => pattern.full_match_bytes(bytes),
        // An optional patterned field may hold the absent marker.
        _ => true,
    }
}
