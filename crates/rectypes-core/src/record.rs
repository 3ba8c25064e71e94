use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::check::type_check;
use crate::constraint::Constraint;
use crate::error::{AttributeError, DefinitionError, Result, TypeError};
use crate::fields::{Field, FieldTable};
use crate::hook::ObjectValidator;
use crate::value::{FieldValues, Value};

/// Shared handle to a registered record type.
pub type TypeHandle = Arc<RecordType>;

/// A record type: a name, a field table, an optional object-level hook, and
/// a mutability policy. Immutable once built.
pub struct RecordType {
    name: String,
    fields: FieldTable,
    validator: Option<Arc<dyn ObjectValidator>>,
    immutable: bool,
}

impl RecordType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.fields.required_fields()
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn validator(&self) -> Option<&Arc<dyn ObjectValidator>> {
        self.validator.as_ref()
    }

    /// Validate `values` and build an instance of this type.
    ///
    /// Unknown keys, unsatisfied constraints and missing mandatory fields are
    /// rejected before the object-level hook runs. Nothing is built on failure.
    pub fn construct(self: &Arc<Self>, values: FieldValues) -> std::result::Result<Record, TypeError> {
        if let Some(unknown) = values.keys().find(|key| !self.fields.contains(key)) {
            return Err(TypeError::UnknownField {
                type_name: self.name.clone(),
                field: unknown.clone(),
            });
        }

        for field in &self.fields {
            match values.get(field.name()) {
                Some(value) => check_field(field, value)?,
                None if field.is_optional() => {}
                None => {
                    return Err(TypeError::MissingField {
                        type_name: self.name.clone(),
                        field: field.name().to_string(),
                    });
                }
            }
        }

        if let Some(validator) = &self.validator {
            let reason = match validator.validate(&values) {
                Ok(true) => None,
                Ok(false) => Some(validator.describe()),
                Err(err) => Some(err.to_string()),
            };
            if let Some(reason) = reason {
                return Err(TypeError::ObjectValidation {
                    type_name: self.name.clone(),
                    reason,
                });
            }
        }

        let mut slots = vec![None; self.fields.len()];
        for (name, value) in values {
            if let Some(position) = self.fields.position(&name) {
                slots[position] = Some(value);
            }
        }

        Ok(Record {
            record_type: Arc::clone(self),
            slots,
        })
    }

    /// A sibling type without the named fields. Unknown names are ignored.
    ///
    /// `self` and its instances are left untouched.
    pub fn subtract_fields(self: &Arc<Self>, names: &[&str]) -> TypeHandle {
        self.subtract_fields_as(self.name.clone(), names)
    }

    /// Like [`subtract_fields`](Self::subtract_fields), naming the sibling
    /// type. Use this for siblings that are registered next to the original.
    pub fn subtract_fields_as(
        self: &Arc<Self>,
        name: impl Into<String>,
        names: &[&str],
    ) -> TypeHandle {
        let name = name.into();
        let fields = self.fields.subtract(names);
        debug!(
            type_name = %self.name,
            sibling = %name,
            removed = self.fields.len() - fields.len(),
            "derived type by field subtraction"
        );
        Arc::new(RecordType {
            name,
            fields,
            validator: self.validator.clone(),
            immutable: self.immutable,
        })
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("immutable", &self.immutable)
            .field(
                "validator",
                &self.validator.as_ref().map(|validator| validator.describe()),
            )
            .finish()
    }
}

fn check_field(field: &Field, value: &Value) -> std::result::Result<(), TypeError> {
    if type_check(value, field.constraint()) {
        Ok(())
    } else {
        Err(TypeError::ConstraintViolation {
            field: field.name().to_string(),
            expected: field.constraint().to_string(),
            value: value.to_string(),
        })
    }
}

/// Declares a record type.
pub struct TypeBuilder {
    name: String,
    own: Vec<Field>,
    ancestors: Vec<TypeHandle>,
    validator: Option<Arc<dyn ObjectValidator>>,
    immutable: bool,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            own: Vec::new(),
            ancestors: Vec::new(),
            validator: None,
            immutable: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare an own field, in order.
    pub fn field(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.own.push(Field::new(name, constraint));
        self
    }

    /// Inherit every field of `ancestor`, after own fields and earlier ancestors.
    pub fn extends(mut self, ancestor: &TypeHandle) -> Self {
        self.ancestors.push(Arc::clone(ancestor));
        self
    }

    /// Attach an object-level validation hook.
    pub fn validator(mut self, validator: impl ObjectValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn shared_validator(mut self, validator: Arc<dyn ObjectValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Reject every mutation of instances of this type.
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub(crate) fn map_constraints(mut self, f: impl Fn(Constraint) -> Constraint) -> Self {
        self.own = self
            .own
            .into_iter()
            .map(|field| {
                let name = field.name().to_string();
                Field::new(name, f(field.constraint().clone()))
            })
            .collect();
        self
    }

    pub fn build(self) -> std::result::Result<TypeHandle, DefinitionError> {
        for field in &self.own {
            field.constraint().validate()?;
            if field.constraint().refers_to(&self.name) {
                return Err(DefinitionError::SelfReference(self.name));
            }
        }

        let ancestor_tables: Vec<&FieldTable> =
            self.ancestors.iter().map(|ancestor| ancestor.fields()).collect();
        let fields = FieldTable::build(&self.name, self.own, &ancestor_tables)?;

        let immutable =
            self.immutable || self.ancestors.iter().any(|ancestor| ancestor.is_immutable());
        let validator = self.validator.or_else(|| {
            self.ancestors
                .iter()
                .find_map(|ancestor| ancestor.validator.clone())
        });

        debug!(
            type_name = %self.name,
            fields = fields.len(),
            ancestors = self.ancestors.len(),
            immutable,
            "record type defined"
        );

        Ok(Arc::new(RecordType {
            name: self.name,
            fields,
            validator,
            immutable,
        }))
    }
}

impl fmt::Debug for TypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeBuilder")
            .field("name", &self.name)
            .field("own", &self.own)
            .field(
                "ancestors",
                &self.ancestors.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("immutable", &self.immutable)
            .finish_non_exhaustive()
    }
}

/// A validated instance of a record type.
///
/// Stored keys are exactly the fields that were supplied; omitted optional
/// fields are absent rather than null.
#[derive(Clone)]
pub struct Record {
    record_type: TypeHandle,
    slots: Vec<Option<Value>>,
}

impl Record {
    pub fn record_type(&self) -> &TypeHandle {
        &self.record_type
    }

    /// Whether this record was constructed by exactly `record_type`.
    pub fn is_instance_of(&self, record_type: &TypeHandle) -> bool {
        Arc::ptr_eq(&self.record_type, record_type)
    }

    /// Look up a field value.
    ///
    /// `Ok(None)` means the field is declared but not stored; an undeclared
    /// name is an [`AttributeError`].
    pub fn get_field(&self, name: &str) -> std::result::Result<Option<&Value>, AttributeError> {
        let position = self.position(name)?;
        Ok(self.slots[position].as_ref())
    }

    /// Replace a field value after checking it against the field's constraint.
    ///
    /// On failure the record is unchanged.
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_mutable(name)?;
        let position = self.position(name)?;
        let value = value.into();
        if let Some(field) = self.record_type.fields().at(position) {
            check_field(field, &value)?;
        }
        self.slots[position] = Some(value);
        Ok(())
    }

    /// Mutable access to a nested record, copying it first if it is shared.
    pub fn get_record_mut(&mut self, name: &str) -> Result<Option<&mut Record>> {
        self.ensure_mutable(name)?;
        let position = self.position(name)?;
        Ok(match &mut self.slots[position] {
            Some(Value::Record(nested)) => Some(Arc::make_mut(nested)),
            _ => None,
        })
    }

    /// Present fields in field-table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_type
            .fields()
            .names()
            .zip(&self.slots)
            .filter_map(|(name, slot)| slot.as_ref().map(|value| (name, value)))
    }

    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.record_type
            .fields()
            .position(name)
            .is_some_and(|position| self.slots[position].is_some())
    }

    /// An owned copy of the stored fields, suitable for another `construct`.
    pub fn values(&self) -> FieldValues {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn position(&self, name: &str) -> std::result::Result<usize, AttributeError> {
        self.record_type
            .fields()
            .position(name)
            .ok_or_else(|| AttributeError {
                type_name: self.record_type.name.clone(),
                field: name.to_string(),
            })
    }

    fn ensure_mutable(&self, name: &str) -> std::result::Result<(), TypeError> {
        if self.record_type.is_immutable() {
            return Err(TypeError::Immutable {
                type_name: self.record_type.name.clone(),
                field: name.to_string(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record_type, &other.record_type) && self.slots == other.slots
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_map();
        for (name, value) in self.iter() {
            dbg.entry(&name, value);
        }
        dbg.finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Declare a record type from field declarations, ancestors and an optional hook.
pub fn define_type<N: Into<String>>(
    name: impl Into<String>,
    fields: impl IntoIterator<Item = (N, Constraint)>,
    ancestors: &[TypeHandle],
    hook: Option<Arc<dyn ObjectValidator>>,
) -> std::result::Result<TypeHandle, DefinitionError> {
    let mut builder = TypeBuilder::new(name);
    for (field, constraint) in fields {
        builder = builder.field(field, constraint);
    }
    for ancestor in ancestors {
        builder = builder.extends(ancestor);
    }
    if let Some(hook) = hook {
        builder = builder.shared_validator(hook);
    }
    builder.build()
}

pub fn construct(record_type: &TypeHandle, values: FieldValues) -> std::result::Result<Record, TypeError> {
    record_type.construct(values)
}

pub fn get_field<'a>(
    record: &'a Record,
    name: &str,
) -> std::result::Result<Option<&'a Value>, AttributeError> {
    record.get_field(name)
}

pub fn set_field(record: &mut Record, name: &str, value: impl Into<Value>) -> Result<()> {
    record.set_field(name, value)
}

pub fn subtract_fields(record_type: &TypeHandle, names: &[&str]) -> TypeHandle {
    record_type.subtract_fields(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::EnumType;
    use crate::error::Error;
    use crate::hook::{AtLeastOneOf, HookError};
    use crate::values;

    fn person() -> TypeHandle {
        TypeBuilder::new("Person")
            .field("name", Constraint::string())
            .build()
            .unwrap()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn types_and_records_cross_threads() {
        assert_send_sync::<TypeHandle>();
        assert_send_sync::<Record>();
        assert_send_sync::<Value>();
        assert_send_sync::<TypeBuilder>();
    }

    #[test]
    fn concurrent_construction_on_a_shared_type() {
        let post = TypeBuilder::new("Post")
            .field("id", Constraint::integer())
            .field("title", Constraint::optional(Constraint::string()))
            .validator(AtLeastOneOf::new(["title"]))
            .build()
            .unwrap();

        let records: Vec<Record> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8_i64)
                .map(|id| {
                    let post = &post;
                    scope.spawn(move || {
                        assert!(post.construct(values! { "id" => id }).is_err());
                        post.construct(values! { "id" => id, "title" => format!("post {id}") })
                            .unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|worker| worker.join().unwrap()).collect()
        });

        assert_eq!(records.len(), 8);
        for (id, record) in records.iter().enumerate() {
            assert!(record.is_instance_of(&post));
            assert_eq!(record.get_field("id").unwrap(), Some(&Value::from(id as i64)));
        }
    }

    #[test]
    fn construct_accepts_valid_values() {
        let record = person().construct(values! { "name" => "foo" }).unwrap();
        assert_eq!(record.get_field("name").unwrap(), Some(&Value::from("foo")));
        assert_eq!(record.to_string(), r#"{"name":"foo"}"#);
    }

    #[test]
    fn construct_rejects_missing_mandatory_field() {
        let err = person().construct(FieldValues::new()).unwrap_err();
        assert_eq!(
            err,
            TypeError::MissingField {
                type_name: "Person".to_string(),
                field: "name".to_string(),
            }
        );
    }

    #[test]
    fn construct_rejects_wrong_type_and_unknown_keys() {
        assert!(matches!(
            person().construct(values! { "name" => 2 }),
            Err(TypeError::ConstraintViolation { .. })
        ));
        assert!(matches!(
            person().construct(values! { "age" => 2 }),
            Err(TypeError::UnknownField { .. })
        ));
        assert!(matches!(
            person().construct(values! { "name" => "foo", "age" => 2 }),
            Err(TypeError::UnknownField { .. })
        ));
    }

    #[test]
    fn element_type_mismatch_is_reported_with_context() {
        let item = TypeBuilder::new("Item")
            .field("value", Constraint::list(Constraint::integer()))
            .build()
            .unwrap();
        let err = item
            .construct(values! { "value" => Value::list(["a", "b"]) })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"["a", "b"] does not satisfy list<integer> for field value"#
        );
    }

    #[test]
    fn omitted_optional_field_is_not_stored() {
        let opt = TypeBuilder::new("Opt")
            .field("name", Constraint::optional(Constraint::string()))
            .build()
            .unwrap();

        let empty = opt.construct(FieldValues::new()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.get_field("name").unwrap(), None);
        assert!(empty.get_field("other").is_err());
        assert_eq!(empty.to_string(), "{}");

        let explicit = opt.construct(values! { "name" => Value::Null }).unwrap();
        assert_eq!(explicit.get_field("name").unwrap(), Some(&Value::Null));

        assert!(opt.construct(values! { "name" => 2 }).is_err());
    }

    #[test]
    fn set_field_validates_and_leaves_record_unchanged_on_failure() {
        let mut record = person().construct(values! { "name" => "foo" }).unwrap();
        record.set_field("name", "bar").unwrap();
        assert_eq!(record.get_field("name").unwrap(), Some(&Value::from("bar")));

        let err = record.set_field("name", 2).unwrap_err();
        assert!(matches!(err, Error::Type(TypeError::ConstraintViolation { .. })));
        assert_eq!(record.get_field("name").unwrap(), Some(&Value::from("bar")));

        let err = record.set_field("age", 2).unwrap_err();
        assert!(matches!(err, Error::Attribute(_)));
    }

    #[test]
    fn set_field_with_current_value_is_idempotent() {
        let mut record = person().construct(values! { "name" => "foo" }).unwrap();
        let current = record.get_field("name").unwrap().cloned().unwrap();
        record.set_field("name", current).unwrap();
        assert_eq!(record.get_field("name").unwrap(), Some(&Value::from("foo")));
    }

    #[test]
    fn immutable_types_reject_every_mutation() {
        let frozen = TypeBuilder::new("SomeImmutable")
            .field("name", Constraint::string())
            .immutable()
            .build()
            .unwrap();
        let mut record = frozen.construct(values! { "name" => "foo" }).unwrap();
        assert!(matches!(
            record.set_field("name", "bar"),
            Err(Error::Type(TypeError::Immutable { .. }))
        ));
        assert!(matches!(
            record.set_field("name", 2),
            Err(Error::Type(TypeError::Immutable { .. }))
        ));
        assert!(matches!(
            record.set_field("unknown", "x"),
            Err(Error::Type(TypeError::Immutable { .. }))
        ));
        assert_eq!(record.get_field("name").unwrap(), Some(&Value::from("foo")));
    }

    #[test]
    fn immutable_parents_refuse_nested_mutable_access() {
        let inner = TypeBuilder::new("Inner")
            .field("v", Constraint::integer())
            .build()
            .unwrap();
        let outer = TypeBuilder::new("FrozenOuter")
            .field("inner", Constraint::record(&inner))
            .immutable()
            .build()
            .unwrap();
        let nested = inner.construct(values! { "v" => 1 }).unwrap();
        let mut record = outer.construct(values! { "inner" => nested }).unwrap();

        let err = record.get_record_mut("inner").unwrap_err();
        assert!(matches!(
            err,
            Error::Type(TypeError::Immutable { ref type_name, ref field })
                if type_name == "FrozenOuter" && field == "inner"
        ));
        let unchanged = match record.get_field("inner").unwrap() {
            Some(Value::Record(nested)) => nested.get_field("v").unwrap().cloned(),
            other => panic!("unexpected inner value: {other:?}"),
        };
        assert_eq!(unchanged, Some(Value::from(1)));
    }

    #[test]
    fn immutability_is_inherited() {
        let base = TypeBuilder::new("Base")
            .field("name", Constraint::string())
            .immutable()
            .build()
            .unwrap();
        let child = TypeBuilder::new("Child").extends(&base).build().unwrap();
        assert!(child.is_immutable());
    }

    #[test]
    fn records_can_seed_sibling_types() {
        let some = TypeBuilder::new("SomeImmutable")
            .field("name", Constraint::string())
            .field("age", Constraint::integer())
            .immutable()
            .build()
            .unwrap();
        let another = TypeBuilder::new("AnotherImmutable")
            .field("name", Constraint::string())
            .field("age", Constraint::optional(Constraint::integer()))
            .immutable()
            .build()
            .unwrap();

        assert!(some.construct(values! { "name" => "foo" }).is_err());

        let a = another.construct(values! { "name" => "foo" }).unwrap();
        let b = another.construct(a.values()).unwrap();
        assert_eq!(b.get_field("name").unwrap(), Some(&Value::from("foo")));

        let mut seed = a.values();
        seed.insert("age".to_string(), Value::from(2));
        let c = some.construct(seed).unwrap();
        assert_eq!(c.get_field("age").unwrap(), Some(&Value::from(2)));
    }

    #[test]
    fn object_validation_runs_after_field_checks() {
        let item = TypeBuilder::new("Item")
            .field("title", Constraint::optional(Constraint::string()))
            .field("content", Constraint::optional(Constraint::string()))
            .validator(AtLeastOneOf::new(["title", "content"]))
            .build()
            .unwrap();

        assert!(item.construct(values! { "title" => "foo" }).is_ok());
        assert!(item.construct(values! { "content" => "foo" }).is_ok());
        assert!(matches!(
            item.construct(FieldValues::new()),
            Err(TypeError::ObjectValidation { .. })
        ));
        // Field-level failures win over the hook.
        assert!(matches!(
            item.construct(values! { "title" => 1 }),
            Err(TypeError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn raising_hook_surfaces_as_object_validation_failure() {
        let item = TypeBuilder::new("Item")
            .field("title", Constraint::optional(Constraint::string()))
            .validator(|fields: &FieldValues| -> std::result::Result<bool, HookError> {
                if fields.contains_key("title") {
                    Ok(true)
                } else {
                    Err("Either `title` or `content` are mandatory".into())
                }
            })
            .build()
            .unwrap();

        let err = item.construct(FieldValues::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Item did not pass object validation: Either `title` or `content` are mandatory"
        );
    }

    #[test]
    fn hook_is_inherited_when_not_overridden() {
        let base = TypeBuilder::new("Base")
            .field("title", Constraint::optional(Constraint::string()))
            .validator(AtLeastOneOf::new(["title"]))
            .build()
            .unwrap();
        let child = TypeBuilder::new("Child").extends(&base).build().unwrap();
        assert!(child.construct(FieldValues::new()).is_err());
    }

    #[test]
    fn multiple_inheritance_merges_fields() {
        let foo = TypeBuilder::new("Foo")
            .field("foo", Constraint::string())
            .build()
            .unwrap();
        let bar = TypeBuilder::new("Bar")
            .field("bar", Constraint::string())
            .build()
            .unwrap();
        let foobar = TypeBuilder::new("FooBar")
            .extends(&foo)
            .extends(&bar)
            .build()
            .unwrap();

        assert_eq!(foobar.fields().len(), 2);
        assert!(foobar
            .construct(values! { "foo" => "foo", "bar" => "bar" })
            .is_ok());
        assert!(foobar.construct(FieldValues::new()).is_err());
    }

    #[test]
    fn subtraction_yields_sibling_type() {
        let foo = TypeBuilder::new("Foo")
            .field("name", Constraint::string())
            .field("age", Constraint::integer())
            .build()
            .unwrap();
        let existing = foo
            .construct(values! { "name" => "n", "age" => 1 })
            .unwrap();

        let without_name = foo.subtract_fields(&["name"]);
        assert_eq!(without_name.fields().len(), foo.fields().len() - 1);
        assert!(without_name.construct(values! { "age" => 2 }).is_ok());
        assert!(without_name
            .construct(values! { "name" => "n", "age" => 2 })
            .is_err());

        assert_eq!(foo.fields().len(), 2);
        assert!(foo.construct(values! { "age" => 2 }).is_err());
        assert_eq!(existing.get_field("name").unwrap(), Some(&Value::from("n")));
        assert!(!existing.is_instance_of(&without_name));
        assert_eq!(without_name.name(), "Foo");

        let ageless = foo.subtract_fields_as("FooNoAge", &["age"]);
        assert_eq!(ageless.name(), "FooNoAge");
        assert_eq!(ageless.required_fields(), vec!["name"]);
        assert_eq!(foo.name(), "Foo");
    }

    #[test]
    fn nested_records_are_validated_and_mutable_in_place() {
        let gender = TypeBuilder::new("Gender")
            .field("female", Constraint::integer())
            .field("male", Constraint::integer())
            .build()
            .unwrap();
        let item = TypeBuilder::new("Item")
            .field("name", Constraint::string())
            .field("gender", Constraint::record(&gender))
            .build()
            .unwrap();

        let g = gender
            .construct(values! { "female" => 10, "male" => 20 })
            .unwrap();
        let mut a = item
            .construct(values! { "name" => "foo", "gender" => g })
            .unwrap();
        assert_eq!(
            a.to_string(),
            r#"{"name":"foo","gender":{"female":10,"male":20}}"#
        );

        let replacement = gender
            .construct(values! { "male" => 30, "female" => 10 })
            .unwrap();
        a.set_field("gender", replacement).unwrap();

        let nested = a.get_record_mut("gender").unwrap().unwrap();
        assert!(nested.set_field("male", "foo").is_err());
        nested.set_field("male", 31).unwrap();
        let male = a
            .get_field("gender")
            .unwrap()
            .and_then(Value::as_record)
            .and_then(|g| g.get_field("male").ok().flatten())
            .cloned();
        assert_eq!(male, Some(Value::from(31)));

        assert!(item
            .construct(values! { "name" => "foo", "gender" => 5 })
            .is_err());
    }

    #[test]
    fn shared_nested_record_is_copied_on_write() {
        let inner = TypeBuilder::new("Inner")
            .field("v", Constraint::integer())
            .build()
            .unwrap();
        let outer = TypeBuilder::new("Outer")
            .field("inner", Constraint::record(&inner))
            .build()
            .unwrap();
        let shared = Arc::new(inner.construct(values! { "v" => 1 }).unwrap());

        let mut first = outer
            .construct(values! { "inner" => Arc::clone(&shared) })
            .unwrap();
        let second = outer
            .construct(values! { "inner" => Arc::clone(&shared) })
            .unwrap();

        first
            .get_record_mut("inner")
            .unwrap()
            .unwrap()
            .set_field("v", 2)
            .unwrap();
        assert_eq!(first.to_string(), r#"{"inner":{"v":2}}"#);
        assert_eq!(second.to_string(), r#"{"inner":{"v":1}}"#);
        assert_eq!(shared.get_field("v").unwrap(), Some(&Value::from(1)));
    }

    #[test]
    fn enum_fields_reject_bare_backing_values() {
        let some_enum =
            EnumType::new("SomeEnum", [("FOO", "Foo"), ("BAR", "Bar"), ("BAZ", "Baz")]).unwrap();
        let item = TypeBuilder::new("Item")
            .field("key", Constraint::enumeration(&some_enum))
            .build()
            .unwrap();
        assert!(item
            .construct(values! { "key" => some_enum.member("FOO").unwrap() })
            .is_ok());
        assert!(matches!(
            item.construct(values! { "key" => "Foo" }),
            Err(TypeError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn builder_rejects_self_reference_and_bad_patterns() {
        let result = TypeBuilder::new("Node")
            .field("next", Constraint::optional(Constraint::forward("Node")))
            .build();
        assert!(matches!(result, Err(DefinitionError::SelfReference(_))));

        let result = TypeBuilder::new("Bad")
            .field(
                "n",
                Constraint::Described {
                    inner: Box::new(Constraint::integer()),
                    description: None,
                    pattern: Some(crate::constraint::Pattern::new(r"\d").unwrap()),
                },
            )
            .build();
        assert!(matches!(result, Err(DefinitionError::PatternOnNonString { .. })));
    }

    #[test]
    fn free_functions_cover_the_full_lifecycle() {
        let base = define_type("Base", [("id", Constraint::integer())], &[], None).unwrap();
        let hook: Arc<dyn ObjectValidator> = Arc::new(AtLeastOneOf::new(["title"]));
        let post = define_type(
            "Post",
            [("title", Constraint::optional(Constraint::string()))],
            &[base],
            Some(hook),
        )
        .unwrap();

        let mut record = construct(&post, values! { "id" => 1, "title" => "hi" }).unwrap();
        set_field(&mut record, "title", "bye").unwrap();
        assert_eq!(get_field(&record, "title").unwrap(), Some(&Value::from("bye")));
        assert!(get_field(&record, "missing").is_err());

        let smaller = subtract_fields(&post, &["id"]);
        assert_eq!(smaller.required_fields(), Vec::<&str>::new());
        assert!(construct(&smaller, FieldValues::new()).is_err());
    }
}
