//! Dialect-aware SQL statement builders for rowmap.
//!
//! `rowmap-query` is the **statement construction layer**. It turns entity
//! metadata and caller-supplied conditions into SQL strings plus positional
//! argument lists, with placeholder style and column qualification driven by
//! a per-backend [`Dialect`] descriptor.
//!
//! # Role In The Architecture
//!
//! - **Builders**: [`Select`], [`Insert`], [`Update`], [`Delete`] — pure,
//!   value-returning builders with a fixed clause order.
//! - **Condition trees**: [`Cond`] composes WHERE/HAVING with AND/OR/NOT
//!   without re-association.
//! - **Relation shapes**: [`relation_select`] and the two-step junction
//!   helpers emit the statements that load resolved relations.
//!
//! Statements are executed by whatever implements `rowmap_core::Executor`;
//! most users go through the `rowmap` facade crate.

pub mod builder;
pub mod clause;
pub mod cond;
pub mod dialect;
pub mod join;
pub mod relation;
pub mod select;

pub use builder::{Delete, Insert, Update};
pub use clause::{OrderBy, OrderDirection};
pub use cond::{CmpOp, Cond, Operand};
pub use dialect::Dialect;
pub use join::{Join, JoinKind};
pub use relation::{junction_select, related_by_keys_select, relation_select};
pub use select::{Aggregate, Select};
