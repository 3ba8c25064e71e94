//! Declarative type definitions loaded from JSON.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::constraint::{Constraint, PrimitiveKind};
use crate::enums::{EnumBacking, EnumType};
use crate::error::DefinitionError;
use crate::hook::AtLeastOneOf;
use crate::record::{TypeBuilder, TypeHandle};
use crate::registry::TypeRegistry;

/// A document of enum and record declarations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Definitions {
    #[serde(default)]
    pub enums: Vec<EnumDecl>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDecl {
    pub name: String,
    /// Variant name to backing value, in declaration order.
    pub variants: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default)]
    pub at_least_one_of: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ConstraintDecl,
}

/// A constraint written either as a bare type name or as a node.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConstraintDecl {
    Name(String),
    Node(NodeDecl),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDecl {
    Optional {
        of: Box<ConstraintDecl>,
    },
    List {
        of: Box<ConstraintDecl>,
    },
    Set {
        of: Box<ConstraintDecl>,
    },
    Tuple {
        of: Vec<ConstraintDecl>,
    },
    Described {
        of: Box<ConstraintDecl>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        pattern: Option<String>,
    },
}

impl ConstraintDecl {
    /// Build the constraint. Names that are not primitives become forward
    /// references, resolved when the owning type is registered.
    pub fn to_constraint(&self) -> Result<Constraint, DefinitionError> {
        Ok(match self {
            ConstraintDecl::Name(name) => match PrimitiveKind::from_name(name) {
                Some(kind) => Constraint::Primitive(kind),
                None => Constraint::forward(name.as_str()),
            },
            ConstraintDecl::Node(NodeDecl::Optional { of }) => Constraint::optional(of.to_constraint()?),
            ConstraintDecl::Node(NodeDecl::List { of }) => Constraint::list(of.to_constraint()?),
            ConstraintDecl::Node(NodeDecl::Set { of }) => Constraint::set(of.to_constraint()?),
            ConstraintDecl::Node(NodeDecl::Tuple { of }) => Constraint::tuple(
                of.iter()
                    .map(ConstraintDecl::to_constraint)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            ConstraintDecl::Node(NodeDecl::Described {
                of,
                description,
                pattern,
            }) => {
                let mut constraint = of.to_constraint()?;
                if let Some(description) = description {
                    constraint = constraint.described(description.as_str());
                }
                if let Some(pattern) = pattern {
                    constraint = constraint.pattern(pattern)?;
                }
                constraint
            }
        })
    }
}

impl Definitions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Register every enum, then every type, in document order.
    pub fn load(&self, registry: &mut TypeRegistry) -> Result<Vec<TypeHandle>, DefinitionError> {
        for decl in &self.enums {
            let enum_type = decl.build()?;
            registry.register_enum(&enum_type)?;
        }

        self.types.iter().map(|decl| decl.define(registry)).collect()
    }
}

impl EnumDecl {
    fn build(&self) -> Result<std::sync::Arc<EnumType>, DefinitionError> {
        let variants = self
            .variants
            .iter()
            .map(|(variant, raw)| {
                EnumBacking::from_json(raw)
                    .map(|backing| (variant.as_str(), backing))
                    .ok_or_else(|| DefinitionError::InvalidEnum {
                        enum_name: self.name.clone(),
                        message: format!("variant {variant} has unsupported backing value {raw}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        EnumType::new(self.name.as_str(), variants)
    }
}

impl TypeDecl {
    fn define(&self, registry: &mut TypeRegistry) -> Result<TypeHandle, DefinitionError> {
        let mut builder = TypeBuilder::new(self.name.as_str());
        for field in &self.fields {
            builder = builder.field(field.name.as_str(), field.ty.to_constraint()?);
        }
        for ancestor in &self.extends {
            let handle = registry
                .get(ancestor)
                .ok_or_else(|| DefinitionError::UnknownType(ancestor.clone()))?;
            builder = builder.extends(handle);
        }
        if self.immutable {
            builder = builder.immutable();
        }
        if !self.at_least_one_of.is_empty() {
            builder = builder.validator(AtLeastOneOf::new(self.at_least_one_of.iter().cloned()));
        }
        registry.define(builder)
    }
}
