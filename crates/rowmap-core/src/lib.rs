//! Core types for rowmap.
//!
//! This crate provides the foundational pieces of the data-mapping engine:
//!
//! - `Entity` trait and `EntitySchema` extraction with a process-wide,
//!   injectable schema registry
//! - `FieldInfo` / `RelationDef` static metadata and resolved
//!   `RelationDescriptor`s
//! - `Value`, `Row`, and the checked `FromValue` conversions
//! - the row binder mapping result sets onto typed records
//! - the `Executor` trait consumed from the embedding application

pub mod binder;
pub mod entity;
pub mod error;
pub mod executor;
pub mod field;
pub mod naming;
pub mod relation;
pub mod row;
pub mod types;
pub mod value;

pub use binder::{bind_all, bind_first, bind_into, bind_nested, bind_record, bind_value};
pub use entity::{Entity, EntitySchema, SchemaRegistry, schema_of};
pub use error::{
    BindError, BuildError, BuildErrorKind, Error, RelationError, RelationErrorKind, Result,
    SchemaError, SchemaErrorKind,
};
pub use executor::Executor;
pub use field::FieldInfo;
pub use relation::{RelationDef, RelationDescriptor, RelationKind, resolve};
pub use row::{ColumnInfo, FromValue, Row};
pub use types::ScalarKind;
pub use value::Value;
