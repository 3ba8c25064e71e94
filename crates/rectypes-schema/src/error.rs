/// Errors that can occur during schema derivation and validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A forward reference reached the deriver without being resolved.
    #[error("unresolved type reference `{0}`")]
    Unresolved(String),

    /// The derived schema could not be compiled.
    #[error("failed to compile schema for {type_name}: {message}")]
    CompileFailed { type_name: String, message: String },

    /// The payload failed schema validation.
    #[error("validation failed for {type_name}: {message}")]
    ValidationFailed { type_name: String, message: String },

    /// The payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No schema registered for the given type name.
    #[error("no schema registered for type {0}")]
    NoSchema(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
