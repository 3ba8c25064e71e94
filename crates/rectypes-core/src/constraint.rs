use std::fmt;
use std::sync::Arc;

use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use crate::enums::EnumType;
use crate::error::DefinitionError;
use crate::record::TypeHandle;

/// Runtime kind of a primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Bytes,
    Integer,
    Float,
    Boolean,
    List,
    Set,
    Tuple,
}

impl PrimitiveKind {
    /// Every kind, in declaration order.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::String,
        PrimitiveKind::Bytes,
        PrimitiveKind::Integer,
        PrimitiveKind::Float,
        PrimitiveKind::Boolean,
        PrimitiveKind::List,
        PrimitiveKind::Set,
        PrimitiveKind::Tuple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::List => "list",
            PrimitiveKind::Set => "set",
            PrimitiveKind::Tuple => "tuple",
        }
    }

    /// Parse a kind from its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// JSON Schema `type` keyword for this kind. Bytes have none.
    pub fn json_type(self) -> Option<&'static str> {
        match self {
            PrimitiveKind::String => Some("string"),
            PrimitiveKind::Integer => Some("integer"),
            PrimitiveKind::Float => Some("number"),
            PrimitiveKind::Boolean => Some("boolean"),
            PrimitiveKind::List | PrimitiveKind::Set | PrimitiveKind::Tuple => Some("array"),
            PrimitiveKind::Bytes => None,
        }
    }

    fn accepts_pattern(self) -> bool {
        matches!(self, PrimitiveKind::String | PrimitiveKind::Bytes)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A regular expression that must match a whole string or byte string.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    text: Regex,
    bytes: BytesRegex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, DefinitionError> {
        let anchored = format!("^(?:{source})$");
        let invalid = |err: regex::Error| DefinitionError::InvalidPattern {
            pattern: source.to_string(),
            message: err.to_string(),
        };
        Ok(Self {
            source: source.to_string(),
            text: Regex::new(&anchored).map_err(invalid)?,
            bytes: BytesRegex::new(&anchored).map_err(invalid)?,
        })
    }

    /// The pattern as written, without the full-match anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn full_match(&self, value: &str) -> bool {
        self.text.is_match(value)
    }

    pub fn full_match_bytes(&self, value: &[u8]) -> bool {
        self.bytes.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

/// A single-field type constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// The value's runtime kind must be exactly this kind.
    Primitive(PrimitiveKind),
    /// The value may be the explicit absent marker.
    Optional(Box<Constraint>),
    /// Homogeneous container. `unique` selects a set rather than a list.
    Sequence { item: Box<Constraint>, unique: bool },
    /// Fixed-length positional container.
    Tuple(Vec<Constraint>),
    /// One of the variants of an enum type.
    Enum(Arc<EnumType>),
    /// An instance of exactly this record type.
    Record(TypeHandle),
    /// Metadata wrapper; the pattern, if any, must also fully match.
    Described {
        inner: Box<Constraint>,
        description: Option<String>,
        pattern: Option<Pattern>,
    },
    /// A type named before it was defined. Resolved at registration when possible.
    Forward(String),
}

impl Constraint {
    pub fn string() -> Self {
        Constraint::Primitive(PrimitiveKind::String)
    }

    pub fn bytes() -> Self {
        Constraint::Primitive(PrimitiveKind::Bytes)
    }

    pub fn integer() -> Self {
        Constraint::Primitive(PrimitiveKind::Integer)
    }

    pub fn float() -> Self {
        Constraint::Primitive(PrimitiveKind::Float)
    }

    pub fn boolean() -> Self {
        Constraint::Primitive(PrimitiveKind::Boolean)
    }

    pub fn optional(inner: Constraint) -> Self {
        Constraint::Optional(Box::new(inner))
    }

    pub fn list(item: Constraint) -> Self {
        Constraint::Sequence {
            item: Box::new(item),
            unique: false,
        }
    }

    pub fn set(item: Constraint) -> Self {
        Constraint::Sequence {
            item: Box::new(item),
            unique: true,
        }
    }

    pub fn tuple(items: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::Tuple(items.into_iter().collect())
    }

    pub fn enumeration(enum_type: &Arc<EnumType>) -> Self {
        Constraint::Enum(Arc::clone(enum_type))
    }

    pub fn record(record_type: &TypeHandle) -> Self {
        Constraint::Record(Arc::clone(record_type))
    }

    pub fn forward(name: impl Into<String>) -> Self {
        Constraint::Forward(name.into())
    }

    /// Attach a description, wrapping `self` unless it is already described.
    pub fn described(self, description: impl Into<String>) -> Self {
        match self {
            Constraint::Described { inner, pattern, .. } => Constraint::Described {
                inner,
                description: Some(description.into()),
                pattern,
            },
            other => Constraint::Described {
                inner: Box::new(other),
                description: Some(description.into()),
                pattern: None,
            },
        }
    }

    /// Attach a full-match pattern.
    ///
    /// Fails when the pattern does not compile or when the wrapped constraint
    /// is not ultimately a string or bytes primitive.
    pub fn pattern(self, pattern: &str) -> Result<Self, DefinitionError> {
        let pattern = Pattern::new(pattern)?;
        let constraint = match self {
            Constraint::Described {
                inner, description, ..
            } => Constraint::Described {
                inner,
                description,
                pattern: Some(pattern),
            },
            other => Constraint::Described {
                inner: Box::new(other),
                description: None,
                pattern: Some(pattern),
            },
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// The primitive reached by unwrapping optional and described wrappers.
    pub fn ultimate_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Constraint::Primitive(kind) => Some(*kind),
            Constraint::Optional(inner) | Constraint::Described { inner, .. } => {
                inner.ultimate_primitive()
            }
            _ => None,
        }
    }

    /// Whether a field with this constraint may be omitted.
    ///
    /// Optionality is seen through description wrappers in both nesting orders.
    pub fn is_optional(&self) -> bool {
        match self {
            Constraint::Optional(_) => true,
            Constraint::Described { inner, .. } => inner.is_optional(),
            _ => false,
        }
    }

    /// Check definition-time invariants of the whole constraint tree.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        match self {
            Constraint::Primitive(_)
            | Constraint::Enum(_)
            | Constraint::Record(_)
            | Constraint::Forward(_) => Ok(()),
            Constraint::Optional(inner) => inner.validate(),
            Constraint::Sequence { item, .. } => item.validate(),
            Constraint::Tuple(items) => items.iter().try_for_each(Constraint::validate),
            Constraint::Described { inner, pattern, .. } => {
                if pattern.is_some()
                    && !inner
                        .ultimate_primitive()
                        .is_some_and(PrimitiveKind::accepts_pattern)
                {
                    return Err(DefinitionError::PatternOnNonString {
                        constraint: inner.to_string(),
                    });
                }
                inner.validate()
            }
        }
    }

    /// Whether an unresolved forward reference to `name` appears anywhere in the tree.
    pub fn refers_to(&self, name: &str) -> bool {
        match self {
            Constraint::Forward(target) => target == name,
            Constraint::Optional(inner)
            | Constraint::Sequence { item: inner, .. }
            | Constraint::Described { inner, .. } => inner.refers_to(name),
            Constraint::Tuple(items) => items.iter().any(|item| item.refers_to(name)),
            Constraint::Primitive(_) | Constraint::Enum(_) | Constraint::Record(_) => false,
        }
    }

    /// Rewrite every forward reference through `resolve`, leaving unresolved ones in place.
    pub fn resolve_forwards(self, resolve: &impl Fn(&str) -> Option<Constraint>) -> Self {
        match self {
            Constraint::Forward(name) => resolve(&name).unwrap_or(Constraint::Forward(name)),
            Constraint::Optional(inner) => {
                Constraint::Optional(Box::new(inner.resolve_forwards(resolve)))
            }
            Constraint::Sequence { item, unique } => Constraint::Sequence {
                item: Box::new(item.resolve_forwards(resolve)),
                unique,
            },
            Constraint::Tuple(items) => Constraint::Tuple(
                items
                    .into_iter()
                    .map(|item| item.resolve_forwards(resolve))
                    .collect(),
            ),
            Constraint::Described {
                inner,
                description,
                pattern,
            } => Constraint::Described {
                inner: Box::new(inner.resolve_forwards(resolve)),
                description,
                pattern,
            },
            other => other,
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::Primitive(a), Constraint::Primitive(b)) => a == b,
            (Constraint::Optional(a), Constraint::Optional(b)) => a == b,
            (
                Constraint::Sequence { item: a, unique: ua },
                Constraint::Sequence { item: b, unique: ub },
            ) => ua == ub && a == b,
            (Constraint::Tuple(a), Constraint::Tuple(b)) => a == b,
            (Constraint::Enum(a), Constraint::Enum(b)) => Arc::ptr_eq(a, b),
            (Constraint::Record(a), Constraint::Record(b)) => Arc::ptr_eq(a, b),
            (
                Constraint::Described {
                    inner: a,
                    description: da,
                    pattern: pa,
                },
                Constraint::Described {
                    inner: b,
                    description: db,
                    pattern: pb,
                },
            ) => a == b && da == db && pa == pb,
            (Constraint::Forward(a), Constraint::Forward(b)) => a == b,
            _ => false,
        }
    }
}

impl From<PrimitiveKind> for Constraint {
    fn from(kind: PrimitiveKind) -> Self {
        Constraint::Primitive(kind)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Primitive(kind) => write!(f, "{kind}"),
            Constraint::Optional(inner) => write!(f, "optional<{inner}>"),
            Constraint::Sequence { item, unique: false } => write!(f, "list<{item}>"),
            Constraint::Sequence { item, unique: true } => write!(f, "set<{item}>"),
            Constraint::Tuple(items) => {
                f.write_str("tuple<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(">")
            }
            Constraint::Enum(enum_type) => write!(f, "enum {}", enum_type.name()),
            Constraint::Record(record_type) => f.write_str(record_type.name()),
            Constraint::Described { inner, pattern, .. } => match pattern {
                Some(pattern) => write!(f, "{inner} matching /{}/", pattern.as_str()),
                None => write!(f, "{inner}"),
            },
            Constraint::Forward(name) => write!(f, "'{name}'"),
        }
    }
}
