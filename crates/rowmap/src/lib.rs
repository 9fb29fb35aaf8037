//! rowmap: an embeddable data-mapping engine.
//!
//! Application code defines plain structs with `#[derive(Entity)]`; the
//! engine extracts their schema once, builds dialect-correct SQL from it,
//! hands the statements to a synchronous [`Executor`] the application
//! provides, and binds the returned rows back onto typed records —
//! including related records resolved from naming conventions.
//!
//! ```ignore
//! use rowmap::{Cond, Dialect, Entity, Mapper};
//!
//! #[derive(Entity, Default)]
//! struct Post {
//!     id: i64,
//!     title: String,
//!     #[entity(has_many)]
//!     comments: Vec<Comment>,
//! }
//!
//! let mut mapper = Mapper::new();
//! mapper.register("default", Dialect::Postgres, executor);
//!
//! let post: Option<Post> = mapper.get(1_i64)?;
//! let comments: Vec<Comment> = mapper.has_many(&post.unwrap())?;
//! ```

pub mod mapper;

pub use mapper::Mapper;

// Core surface
pub use rowmap_core::{
    BindError, BuildError, BuildErrorKind, ColumnInfo, Entity, EntitySchema, Error, Executor,
    FieldInfo, FromValue, RelationDef, RelationDescriptor, RelationError, RelationErrorKind,
    RelationKind, Result, Row, ScalarKind, SchemaError, SchemaErrorKind, SchemaRegistry, Value,
    bind_all, bind_first, bind_into, bind_record, schema_of,
};

// Statement builders
pub use rowmap_query::{
    Aggregate, CmpOp, Cond, Delete, Dialect, Insert, Join, JoinKind, Operand, OrderBy, Select,
    Update, junction_select, related_by_keys_select, relation_select,
};

// Derive macro
pub use rowmap_macros::Entity;
