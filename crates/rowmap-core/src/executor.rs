//! The execution collaborator interface.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;
use std::sync::Arc;

/// The synchronous execution capability this engine is embedded against.
///
/// Connection acquisition, pooling, transactions, and the concrete driver
/// all live behind this trait; the engine only ever hands it a finished
/// statement with its positional arguments. Implementations report failures
/// through [`crate::Error::Executor`] so nothing is swallowed.
///
/// The trait is object-safe: callers typically hold one
/// `Box<dyn Executor + Send + Sync>` per named connection.
pub trait Executor {
    /// Run a query and return its rows, with column names as the driver
    /// reported them.
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>>;

    /// Run a statement and return the affected-row count, or the last
    /// insert id for inserts on drivers that report one.
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        (**self).query(sql, args)
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        (**self).execute(sql, args)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        (**self).query(sql, args)
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        (**self).execute(sql, args)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        (**self).query(sql, args)
    }

    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        (**self).execute(sql, args)
    }
}
