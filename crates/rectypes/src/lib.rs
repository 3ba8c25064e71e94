//! Typed records with field constraints, validated at construction and
//! mutation time, and JSON Schema documents derived from their types.
//!
//! # Crate Structure
//!
//! - [`types`]: Constraints, record types, instances, the type registry and
//!   the textual codec
//! - [`schema`]: Schema derivation and upstream payload validation (behind
//!   `schema` feature)

/// Re-export record and constraint types.
pub mod types {
    pub use rectypes_core::*;
}

/// Re-export schema types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use rectypes_schema::*;
}

pub use rectypes_core::values;
