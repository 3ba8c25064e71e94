use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::constraint::PrimitiveKind;
use crate::error::DefinitionError;

/// The backing value of an enum variant.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumBacking {
    Int(i64),
    Float(f64),
    Str(String),
}

impl EnumBacking {
    /// The primitive kind this backing value belongs to.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            EnumBacking::Int(_) => PrimitiveKind::Integer,
            EnumBacking::Float(_) => PrimitiveKind::Float,
            EnumBacking::Str(_) => PrimitiveKind::String,
        }
    }

    /// The backing value as raw JSON.
    pub fn to_json(&self) -> JsonValue {
        match self {
            EnumBacking::Int(v) => JsonValue::from(*v),
            EnumBacking::Float(v) => JsonValue::from(*v),
            EnumBacking::Str(v) => JsonValue::from(v.as_str()),
        }
    }

    /// Parse a raw JSON scalar into a backing value.
    pub fn from_json(raw: &JsonValue) -> Option<Self> {
        match raw {
            JsonValue::String(s) => Some(EnumBacking::Str(s.clone())),
            JsonValue::Number(n) => match n.as_i64() {
                Some(v) => Some(EnumBacking::Int(v)),
                None => n.as_f64().map(EnumBacking::Float),
            },
            _ => None,
        }
    }
}

impl From<&str> for EnumBacking {
    fn from(value: &str) -> Self {
        EnumBacking::Str(value.to_string())
    }
}

impl From<String> for EnumBacking {
    fn from(value: String) -> Self {
        EnumBacking::Str(value)
    }
}

impl From<i64> for EnumBacking {
    fn from(value: i64) -> Self {
        EnumBacking::Int(value)
    }
}

impl From<i32> for EnumBacking {
    fn from(value: i32) -> Self {
        EnumBacking::Int(i64::from(value))
    }
}

impl From<f64> for EnumBacking {
    fn from(value: f64) -> Self {
        EnumBacking::Float(value)
    }
}

impl fmt::Display for EnumBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumBacking::Int(v) => write!(f, "{v}"),
            EnumBacking::Float(v) => write!(f, "{v}"),
            EnumBacking::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl Serialize for EnumBacking {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EnumBacking::Int(v) => serializer.serialize_i64(*v),
            EnumBacking::Float(v) => serializer.serialize_f64(*v),
            EnumBacking::Str(v) => serializer.serialize_str(v),
        }
    }
}

/// A closed set of named variants sharing one backing kind.
///
/// Identity is the `Arc` identity of the enum type: a member of one enum never
/// satisfies a constraint on another, even with equal backing values.
#[derive(Debug)]
pub struct EnumType {
    name: String,
    variants: Vec<(String, EnumBacking)>,
}

impl EnumType {
    /// Declare an enum from `(variant name, backing value)` pairs.
    pub fn new<N, B>(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = (N, B)>,
    ) -> Result<Arc<Self>, DefinitionError>
    where
        N: Into<String>,
        B: Into<EnumBacking>,
    {
        let name = name.into();
        let variants: Vec<(String, EnumBacking)> = variants
            .into_iter()
            .map(|(variant, backing)| (variant.into(), backing.into()))
            .collect();

        let invalid = |message: String| DefinitionError::InvalidEnum {
            enum_name: name.clone(),
            message,
        };

        let Some((_, first)) = variants.first() else {
            return Err(invalid("no variants declared".to_string()));
        };
        let kind = first.kind();

        for (i, (variant, backing)) in variants.iter().enumerate() {
            if matches!(backing, EnumBacking::Float(v) if !v.is_finite()) {
                return Err(invalid(format!(
                    "variant {variant} has non-finite backing value {backing}"
                )));
            }
            if backing.kind() != kind {
                return Err(invalid(format!(
                    "variant {variant} is backed by {} but {name} is backed by {}",
                    backing.kind(),
                    kind
                )));
            }
            for (other, other_backing) in &variants[..i] {
                if other == variant {
                    return Err(invalid(format!("variant {variant} is declared twice")));
                }
                if other_backing == backing {
                    return Err(invalid(format!(
                        "variants {other} and {variant} share the backing value {backing}"
                    )));
                }
            }
        }

        Ok(Arc::new(Self { name, variants }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind shared by every backing value.
    pub fn backing_kind(&self) -> PrimitiveKind {
        self.variants[0].1.kind()
    }

    /// Backing values in declaration order.
    pub fn backing_values(&self) -> impl Iterator<Item = &EnumBacking> {
        self.variants.iter().map(|(_, backing)| backing)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Look up a variant by name.
    pub fn member(self: &Arc<Self>, variant: &str) -> Option<EnumMember> {
        self.variants
            .iter()
            .position(|(name, _)| name == variant)
            .map(|index| EnumMember {
                enum_type: Arc::clone(self),
                index,
            })
    }

    /// Look up the variant whose backing value equals `raw`.
    pub fn from_backing(self: &Arc<Self>, raw: &JsonValue) -> Option<EnumMember> {
        let backing = EnumBacking::from_json(raw)?;
        let backing = match (self.backing_kind(), backing) {
            (PrimitiveKind::Float, EnumBacking::Int(v)) => EnumBacking::Float(v as f64),
            (_, backing) => backing,
        };
        self.variants
            .iter()
            .position(|(_, candidate)| *candidate == backing)
            .map(|index| EnumMember {
                enum_type: Arc::clone(self),
                index,
            })
    }

    /// Every variant in declaration order.
    pub fn members(self: &Arc<Self>) -> Vec<EnumMember> {
        (0..self.variants.len())
            .map(|index| EnumMember {
                enum_type: Arc::clone(self),
                index,
            })
            .collect()
    }
}

/// A variant object of an [`EnumType`].
#[derive(Clone)]
pub struct EnumMember {
    enum_type: Arc<EnumType>,
    index: usize,
}

impl EnumMember {
    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.enum_type
    }

    pub fn name(&self) -> &str {
        &self.enum_type.variants[self.index].0
    }

    pub fn backing(&self) -> &EnumBacking {
        &self.enum_type.variants[self.index].1
    }

    /// Whether this member belongs to exactly `enum_type`.
    pub fn is_member_of(&self, enum_type: &Arc<EnumType>) -> bool {
        Arc::ptr_eq(&self.enum_type, enum_type)
    }
}

impl PartialEq for EnumMember {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.enum_type, &other.enum_type) && self.index == other.index
    }
}

impl fmt::Debug for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_type.name, self.name())
    }
}

impl fmt::Display for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_type.name, self.name())
    }
}
