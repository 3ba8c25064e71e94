//! Typed records validated at construction and mutation time.
//!
//! A record type is a name, an ordered field table and an optional
//! object-level hook. Every field carries a [`Constraint`]: a primitive kind,
//! an optional wrapper, a homogeneous list or set, a fixed tuple, an enum, a
//! nested record type, or any of those annotated with a description and a
//! full-match pattern.
//!
//! Instances are built with [`RecordType::construct`] and changed with
//! [`Record::set_field`]; both reject values that do not satisfy their field's
//! constraint and leave nothing half-built behind.
//!
//! ```
//! use rectypes_core::{values, Constraint, TypeBuilder};
//!
//! let person = TypeBuilder::new("Person")
//!     .field("name", Constraint::string())
//!     .field("age", Constraint::optional(Constraint::integer()))
//!     .build()?;
//! let mut ann = person.construct(values! { "name" => "ann" })?;
//! ann.set_field("age", 41)?;
//! assert_eq!(ann.to_string(), r#"{"name":"ann","age":41}"#);
//! assert!(ann.set_field("age", "old").is_err());
//! # Ok::<(), rectypes_core::Error>(())
//! ```

pub mod check;
pub mod codec;
pub mod constraint;
pub mod decl;
pub mod enums;
pub mod error;
pub mod fields;
pub mod hook;
pub mod record;
pub mod registry;
pub mod value;

pub use check::type_check;
pub use codec::{decode_record, deserialize, serialize, serialize_pretty, RawFields};
pub use constraint::{Constraint, Pattern, PrimitiveKind};
pub use decl::{ConstraintDecl, Definitions};
pub use enums::{EnumBacking, EnumMember, EnumType};
pub use error::{AttributeError, CodecError, DefinitionError, Error, Result, TypeError};
pub use fields::{Field, FieldTable};
pub use hook::{AtLeastOneOf, HookError, ObjectValidator};
pub use record::{
    construct, define_type, get_field, set_field, subtract_fields, Record, RecordType,
    TypeBuilder, TypeHandle,
};
pub use registry::{Registered, TypeRegistry};
pub use value::{FieldValues, Value};

/// Build a [`FieldValues`] map from `name => value` pairs.
///
/// Values go through `Value::from`, so plain literals, enum members and
/// records can be mixed freely.
#[macro_export]
macro_rules! values {
    () => {
        $crate::FieldValues::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::FieldValues::new();
        $(
            values.insert(::std::string::String::from($name), $crate::Value::from($value));
        )+
        values
    }};
}
