//! Binding result rows onto typed records.
//!
//! The binder walks a result set and offers every column of every row to the
//! destination record's [`Entity::bind_column`]. Columns nothing claims are
//! ignored (SELECT * over-fetching is fine); a claimed column whose value
//! cannot convert aborts the whole bind with that error. Rows bound before
//! the failure are left as they are — recovery belongs to the caller.

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::row::{FromValue, Row};
use crate::value::Value;

/// Convert one column value for a field, attaching the column name to any
/// conversion error.
pub fn bind_value<T: FromValue>(column: &str, value: &Value) -> Result<T> {
    T::from_value(value).map_err(|e| match e {
        Error::Bind(mut be) => {
            be.column = Some(column.to_string());
            Error::Bind(be)
        }
        other => other,
    })
}

/// Offer a column to a nested relation field, one level deep.
///
/// Only columns qualified with the related entity's table name
/// (`addresses.path`) are offered; the nested record is created on its
/// first matching column. Unqualified columns never reach nested records,
/// so sibling entities with same-named columns cannot contaminate each
/// other and delegation terminates on cyclic entity graphs.
pub fn bind_nested<E: Entity>(slot: &mut Option<E>, column: &str, value: &Value) -> Result<bool> {
    let Some((table, _)) = column.split_once('.') else {
        return Ok(false);
    };
    if table != E::TABLE {
        return Ok(false);
    }
    slot.get_or_insert_with(E::default).bind_column(column, value)
}

/// Bind one row onto an existing record.
pub fn bind_record<E: Entity>(record: &mut E, row: &Row) -> Result<()> {
    for (column, value) in row.iter() {
        record.bind_column(column, value)?;
    }
    Ok(())
}

/// Bind the first row of a result set into a fresh record.
///
/// Only the first row is consumed; `None` for an empty result set.
pub fn bind_first<E: Entity>(rows: &[Row]) -> Result<Option<E>> {
    match rows.first() {
        Some(row) => {
            let mut record = E::default();
            bind_record(&mut record, row)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// Bind every row of a result set into a fresh sequence, in row order.
pub fn bind_all<E: Entity>(rows: &[Row]) -> Result<Vec<E>> {
    let mut records = Vec::with_capacity(rows.len());
    bind_into(rows, &mut records)?;
    Ok(records)
}

/// Bind rows into an existing sequence, one destination element per row in
/// row order.
///
/// Pre-sized elements are reused in place; the sequence grows when it is
/// shorter than the result set. Elements beyond the row count are left
/// untouched.
pub fn bind_into<E: Entity>(rows: &[Row], dest: &mut Vec<E>) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        if i >= dest.len() {
            dest.push(E::default());
        }
        bind_record(&mut dest[i], row)?;
    }
    Ok(())
}
