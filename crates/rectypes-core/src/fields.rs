use crate::constraint::Constraint;
use crate::error::DefinitionError;

/// A named field and its constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    constraint: Constraint,
}

impl Field {
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn is_optional(&self) -> bool {
        self.constraint.is_optional()
    }
}

/// Ordered mapping of field name to constraint.
///
/// Immutable once its type is built; [`subtract`](Self::subtract) returns a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTable {
    fields: Vec<Field>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a type's own fields with its ancestors' tables.
    ///
    /// Own fields come first in declaration order, then each ancestor's fields
    /// in ancestor order. A repeated name is skipped when its constraint is
    /// identical and rejected when it differs.
    pub fn build(
        type_name: &str,
        own: Vec<Field>,
        ancestors: &[&FieldTable],
    ) -> Result<Self, DefinitionError> {
        let mut table = FieldTable::new();

        for field in own {
            if table.contains(&field.name) {
                return Err(DefinitionError::DuplicateField {
                    type_name: type_name.to_string(),
                    field: field.name,
                });
            }
            table.fields.push(field);
        }

        for ancestor in ancestors {
            for field in &ancestor.fields {
                match table.get(&field.name) {
                    Some(existing) if existing == &field.constraint => {}
                    Some(existing) => {
                        return Err(DefinitionError::ConflictingField {
                            field: field.name.clone(),
                            first: existing.to_string(),
                            second: field.constraint.to_string(),
                        });
                    }
                    None => table.fields.push(field.clone()),
                }
            }
        }

        Ok(table)
    }

    /// A new table without the named fields. Unknown names are ignored.
    pub fn subtract(&self, names: &[&str]) -> FieldTable {
        FieldTable {
            fields: self
                .fields
                .iter()
                .filter(|field| !names.contains(&field.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Names of every field that is not optional, in table order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| !field.is_optional())
            .map(Field::name)
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(Field::constraint)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// The field at `index` in table order.
    pub fn at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldTable {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
