/// Errors raised while declaring a record or enum type.
///
/// These are always fatal to the declaration that produced them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The same field name was declared twice on one type.
    #[error("field `{field}` is declared twice on {type_name}")]
    DuplicateField { type_name: String, field: String },

    /// Two sources (own fields or ancestors) declare one name with different constraints.
    #[error("field `{field}` is inherited with conflicting constraints: {first} vs {second}")]
    ConflictingField {
        field: String,
        first: String,
        second: String,
    },

    /// A pattern was attached to something that is not a string or bytes primitive.
    #[error("pattern can only constrain string or bytes values, not {constraint}")]
    PatternOnNonString { constraint: String },

    /// The pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A type refers to itself, directly or through a forward reference.
    #[error("type {0} refers to itself")]
    SelfReference(String),

    /// A type or enum with this name is already registered.
    #[error("type {0} is already registered")]
    DuplicateType(String),

    /// A record type was registered under a name other than its own.
    #[error("type {type_name} cannot be registered as {registered}")]
    NameMismatch {
        registered: String,
        type_name: String,
    },

    /// A declaration names a type that is not registered.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// The enum declaration is malformed.
    #[error("invalid enum {enum_name}: {message}")]
    InvalidEnum { enum_name: String, message: String },
}

/// Value-level validation failures raised by construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// A supplied key is not part of the type's field table.
    #[error("{field} is not a key for {type_name}")]
    UnknownField { type_name: String, field: String },

    /// A non-optional field was not supplied.
    #[error("{field} is a mandatory field of {type_name}")]
    MissingField { type_name: String, field: String },

    /// A value does not satisfy the field's constraint.
    #[error("{value} does not satisfy {expected} for field {field}")]
    ConstraintViolation {
        field: String,
        expected: String,
        value: String,
    },

    /// The object-level validation hook rejected the field set.
    #[error("{type_name} did not pass object validation: {reason}")]
    ObjectValidation { type_name: String, reason: String },

    /// Mutation was attempted on an immutable record.
    #[error("{type_name} is immutable, cannot set {field}")]
    Immutable { type_name: String, field: String },
}

/// Access to a field name that the type does not declare.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{type_name} has no field {field}")]
pub struct AttributeError {
    pub type_name: String,
    pub field: String,
}

/// Errors from the textual encoding of records.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not valid JSON.
    #[error("malformed record text: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A raw field value cannot be converted to the field's constraint.
    #[error("cannot decode field {field}: {message}")]
    Decode { field: String, message: String },

    /// The decoded values failed validation.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Any error produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("attribute error: {0}")]
    Attribute(#[from] AttributeError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, Error>;
