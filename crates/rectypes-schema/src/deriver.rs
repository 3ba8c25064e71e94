use std::sync::Arc;

use rectypes_core::{Constraint, EnumType, PrimitiveKind, RecordType};
use serde_json::{Map, Value};

use crate::config::DeriveConfig;
use crate::error::{Result, SchemaError};

/// A derived JSON Schema document.
pub type Document = Map<String, Value>;

/// Anything a schema document can be derived from.
pub trait SchemaTarget {
    fn derive_with(&self, deriver: &SchemaDeriver) -> Result<Document>;
}

impl SchemaTarget for Constraint {
    fn derive_with(&self, deriver: &SchemaDeriver) -> Result<Document> {
        deriver.constraint(self)
    }
}

impl SchemaTarget for RecordType {
    fn derive_with(&self, deriver: &SchemaDeriver) -> Result<Document> {
        deriver.record(self)
    }
}

impl SchemaTarget for Arc<RecordType> {
    fn derive_with(&self, deriver: &SchemaDeriver) -> Result<Document> {
        deriver.record(self)
    }
}

impl SchemaTarget for EnumType {
    fn derive_with(&self, _deriver: &SchemaDeriver) -> Result<Document> {
        Ok(enum_schema(self))
    }
}

impl SchemaTarget for Arc<EnumType> {
    fn derive_with(&self, _deriver: &SchemaDeriver) -> Result<Document> {
        Ok(enum_schema(self))
    }
}

/// Derive a document with the default configuration.
pub fn derive_schema<T: SchemaTarget + ?Sized>(target: &T) -> Result<Document> {
    SchemaDeriver::new().derive(target)
}

/// Derives schema documents from constraints and types.
///
/// Derivation is pure: the same target and configuration always produce the
/// same document.
#[derive(Debug, Clone, Default)]
pub struct SchemaDeriver {
    config: DeriveConfig,
}

impl SchemaDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DeriveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeriveConfig {
        &self.config
    }

    /// Derive the root document for `target`.
    pub fn derive<T: SchemaTarget + ?Sized>(&self, target: &T) -> Result<Document> {
        let body = target.derive_with(self)?;
        Ok(match &self.config.dialect {
            Some(dialect) => {
                let mut document = Document::new();
                document.insert("$schema".to_string(), Value::from(dialect.as_str()));
                document.extend(body);
                document
            }
            None => body,
        })
    }

    fn constraint(&self, constraint: &Constraint) -> Result<Document> {
        match constraint {
            Constraint::Primitive(kind) => Ok(primitive_schema(*kind)),
            Constraint::Sequence { item, unique } => {
                let mut document = type_document("array");
                document.insert("items".to_string(), Value::Object(self.constraint(item)?));
                if *unique {
                    document.insert("uniqueItems".to_string(), Value::Bool(true));
                }
                Ok(document)
            }
            Constraint::Tuple(positions) => {
                let items = positions
                    .iter()
                    .map(|position| self.constraint(position).map(Value::Object))
                    .collect::<Result<Vec<_>>>()?;
                let mut document = type_document("array");
                document.insert("items".to_string(), Value::Array(items));
                Ok(document)
            }
            Constraint::Enum(enum_type) => Ok(enum_schema(enum_type)),
            Constraint::Record(record_type) => self.record(record_type),
            Constraint::Described {
                inner,
                description,
                pattern,
            } => {
                let mut document = self.constraint(inner)?;
                if let Some(description) = description {
                    document.insert("description".to_string(), Value::from(description.as_str()));
                }
                if let Some(pattern) = pattern {
                    document.insert("pattern".to_string(), Value::from(pattern.as_str()));
                }
                Ok(document)
            }
            // Optionality shows only as absence from the parent's `required`.
            Constraint::Optional(inner) => self.constraint(inner),
            Constraint::Forward(name) => Err(SchemaError::Unresolved(name.clone())),
        }
    }

    fn record(&self, record_type: &RecordType) -> Result<Document> {
        let mut properties = Map::new();
        for field in record_type.fields() {
            properties.insert(
                field.name().to_string(),
                Value::Object(self.constraint(field.constraint())?),
            );
        }

        let mut document = Document::new();
        if self.config.include_titles {
            document.insert("title".to_string(), Value::from(record_type.name()));
        }
        document.insert("type".to_string(), Value::from("object"));
        document.insert("properties".to_string(), Value::Object(properties));

        let required = record_type.required_fields();
        if !required.is_empty() {
            document.insert(
                "required".to_string(),
                Value::Array(required.into_iter().map(Value::from).collect()),
            );
        }
        if self.config.strict_mode {
            document.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        Ok(document)
    }
}

fn type_document(json_type: &str) -> Document {
    let mut document = Document::new();
    document.insert("type".to_string(), Value::from(json_type));
    document
}

fn primitive_schema(kind: PrimitiveKind) -> Document {
    kind.json_type().map(type_document).unwrap_or_default()
}

fn enum_schema(enum_type: &EnumType) -> Document {
    let mut document = primitive_schema(enum_type.backing_kind());
    document.insert(
        "enum".to_string(),
        Value::Array(enum_type.backing_values().map(|backing| backing.to_json()).collect()),
    );
    document
}
