/// URI of the JSON Schema dialect that derived documents follow.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Controls the shape of derived schema documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeriveConfig {
    /// When true, object schemas reject properties that are not fields.
    pub strict_mode: bool,
    /// When true, record schemas carry their type name as `title`.
    pub include_titles: bool,
    /// Emitted as `$schema` on the root document when set.
    pub dialect: Option<String>,
}

/// Controls schema registry behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// How documents are derived before compilation.
    pub derive: DeriveConfig,
    /// When true, type names without a schema return `SchemaError::NoSchema`.
    pub fail_on_missing_schema: bool,
}
