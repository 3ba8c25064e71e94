use std::fmt;

use crate::value::FieldValues;

/// Error raised from inside a validation hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Object-level validation run after every field has passed its own check.
///
/// Returning `Ok(false)` or an error rejects the candidate field set.
pub trait ObjectValidator: Send + Sync {
    fn validate(&self, fields: &FieldValues) -> Result<bool, HookError>;

    /// Short description used in error messages and diagnostics.
    fn describe(&self) -> String {
        "object validation hook".to_string()
    }
}

impl<F> ObjectValidator for F
where
    F: Fn(&FieldValues) -> Result<bool, HookError> + Send + Sync,
{
    fn validate(&self, fields: &FieldValues) -> Result<bool, HookError> {
        self(fields)
    }
}

/// Accepts a field set only when at least one of the named fields holds a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtLeastOneOf {
    names: Vec<String>,
}

impl AtLeastOneOf {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl ObjectValidator for AtLeastOneOf {
    fn validate(&self, fields: &FieldValues) -> Result<bool, HookError> {
        Ok(self
            .names
            .iter()
            .any(|name| fields.get(name).is_some_and(|value| !value.is_null())))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AtLeastOneOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at least one of [{}] is required", self.names.join(", "))
    }
}
