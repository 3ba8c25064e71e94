use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::constraint::Constraint;
use crate::enums::EnumType;
use crate::error::DefinitionError;
use crate::record::{TypeBuilder, TypeHandle};

/// A registered name.
#[derive(Debug, Clone)]
pub enum Registered {
    Record(TypeHandle),
    Enum(Arc<EnumType>),
}

impl Registered {
    fn as_constraint(&self) -> Constraint {
        match self {
            Registered::Record(handle) => Constraint::record(handle),
            Registered::Enum(enum_type) => Constraint::enumeration(enum_type),
        }
    }
}

/// Name-keyed registry of record and enum types.
///
/// Forward references in a type's own fields are resolved against the types
/// already registered when it is defined. Registration is meant to happen
/// during a single-threaded startup phase; lookups are read-only afterwards.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, Registered>,
    order: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve forward references, build the type, and register it under its name.
    pub fn define(&mut self, builder: TypeBuilder) -> Result<TypeHandle, DefinitionError> {
        self.ensure_vacant(builder.name())?;
        let builder = builder.map_constraints(|constraint| self.resolve(constraint));
        let handle = builder.build()?;
        self.insert(handle.name().to_string(), Registered::Record(Arc::clone(&handle)));
        Ok(handle)
    }

    /// Register an already-built record type, e.g. one produced by
    /// [`RecordType::subtract_fields_as`].
    ///
    /// `name` must be the type's own name: lookups by the registered name and
    /// by `handle.name()` always agree.
    ///
    /// [`RecordType::subtract_fields_as`]: crate::record::RecordType::subtract_fields_as
    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        handle: &TypeHandle,
    ) -> Result<(), DefinitionError> {
        let name = name.into();
        if name != handle.name() {
            return Err(DefinitionError::NameMismatch {
                registered: name,
                type_name: handle.name().to_string(),
            });
        }
        self.ensure_vacant(&name)?;
        self.insert(name, Registered::Record(Arc::clone(handle)));
        Ok(())
    }

    pub fn register_enum(&mut self, enum_type: &Arc<EnumType>) -> Result<(), DefinitionError> {
        self.ensure_vacant(enum_type.name())?;
        self.insert(
            enum_type.name().to_string(),
            Registered::Enum(Arc::clone(enum_type)),
        );
        Ok(())
    }

    /// Replace every resolvable forward reference in `constraint`.
    pub fn resolve(&self, constraint: Constraint) -> Constraint {
        constraint.resolve_forwards(&|name: &str| {
            self.entries.get(name).map(Registered::as_constraint)
        })
    }

    pub fn get(&self, name: &str) -> Option<&TypeHandle> {
        match self.entries.get(name) {
            Some(Registered::Record(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn get_enum(&self, name: &str) -> Option<&Arc<EnumType>> {
        match self.entries.get(name) {
            Some(Registered::Enum(enum_type)) => Some(enum_type),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Record types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeHandle> {
        self.order.iter().filter_map(|name| self.get(name))
    }

    /// Every registered name in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn ensure_vacant(&self, name: &str) -> Result<(), DefinitionError> {
        if self.entries.contains_key(name) {
            return Err(DefinitionError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, name: String, entry: Registered) {
        debug!(name = %name, kind = entry_kind(&entry), "type registered");
        self.order.push(name.clone());
        self.entries.insert(name, entry);
    }
}

fn entry_kind(entry: &Registered) -> &'static str {
    match entry {
        Registered::Record(_) => "record",
        Registered::Enum(_) => "enum",
    }
}
