//! JSON Schema documents derived from record types.
//!
//! [`derive_schema`] turns a constraint, record type or enum into a
//! draft-07 shaped document. [`SchemaRegistry`] compiles those documents so
//! raw JSON payloads can be checked before they are decoded into records.

pub mod config;
pub mod deriver;
pub mod error;
pub mod registry;
pub mod validator;

pub use config::{DeriveConfig, RegistryConfig, DRAFT_07};
pub use deriver::{derive_schema, Document, SchemaDeriver, SchemaTarget};
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
