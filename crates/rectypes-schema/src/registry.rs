use std::collections::HashMap;

use jsonschema::Validator;
use rectypes_core::{Record, RecordType, TypeRegistry};
use serde_json::Value;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::deriver::{Document, SchemaDeriver};
use crate::error::{Result, SchemaError};
use crate::validator::{validate_instance, validate_payload};

struct CompiledSchema {
    document: Document,
    validator: Validator,
}

/// Type-name-keyed registry of compiled JSON Schema validators.
///
/// Lets raw JSON payloads be rejected before they are decoded into records.
pub struct SchemaRegistry {
    schemas: HashMap<String, CompiledSchema>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            config,
        }
    }

    /// Derive, compile and register the schema of a record type under its name.
    pub fn register(&mut self, record_type: &RecordType) -> Result<()> {
        let deriver = SchemaDeriver::with_config(self.config.derive.clone());
        let document = deriver.derive(record_type)?;
        self.register_document(record_type.name(), document)
    }

    /// Register every record type of a type registry.
    pub fn register_all(&mut self, types: &TypeRegistry) -> Result<()> {
        for record_type in types.types() {
            self.register(record_type)?;
        }
        Ok(())
    }

    /// Compile and register a schema document under `type_name`.
    pub fn register_document(&mut self, type_name: &str, document: Document) -> Result<()> {
        let validator = jsonschema::draft7::new(&Value::Object(document.clone())).map_err(|err| {
            SchemaError::CompileFailed {
                type_name: type_name.to_string(),
                message: err.to_string(),
            }
        })?;

        debug!(type_name, properties = document.len(), "schema compiled");
        self.schemas.insert(
            type_name.to_string(),
            CompiledSchema {
                document,
                validator,
            },
        );
        Ok(())
    }

    /// Validate a raw JSON payload against the schema registered for `type_name`.
    pub fn validate(&self, type_name: &str, payload: &[u8]) -> Result<()> {
        match self.schemas.get(type_name) {
            Some(schema) => validate_payload(type_name, payload, &schema.validator),
            None => self.missing(type_name),
        }
    }

    /// Validate an already-parsed JSON value.
    pub fn validate_value(&self, type_name: &str, value: &Value) -> Result<()> {
        match self.schemas.get(type_name) {
            Some(schema) => validate_instance(type_name, value, &schema.validator),
            None => self.missing(type_name),
        }
    }

    /// Validate the raw encoding of a record against its type's schema.
    pub fn validate_record(&self, record: &Record) -> Result<()> {
        self.validate_value(
            record.record_type().name(),
            &Value::Object(record.to_raw()),
        )
    }

    /// Check if a type name has a registered schema.
    pub fn has_schema(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// The registered document for a type name.
    pub fn document(&self, type_name: &str) -> Option<&Document> {
        self.schemas.get(type_name).map(|schema| &schema.document)
    }

    /// Get type names that have registered schemas, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn missing(&self, type_name: &str) -> Result<()> {
        if self.config.fail_on_missing_schema {
            Err(SchemaError::NoSchema(type_name.to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
