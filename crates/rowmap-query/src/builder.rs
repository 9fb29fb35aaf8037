//! INSERT, UPDATE, and DELETE statement builders.

use crate::cond::Cond;
use crate::dialect::Dialect;
use rowmap_core::{BuildErrorKind, Entity, Error, Result, SchemaErrorKind, Value};

/// INSERT statement builder supporting multi-row batches.
#[derive(Debug, Clone, Default)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Insert {
    /// Create an INSERT into a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build an INSERT from an entity's stored fields.
    ///
    /// The primary-key column is skipped when its value is NULL so
    /// auto-increment keys stay with the database.
    pub fn from_entity<E: Entity>(record: &E) -> Self {
        let pk_column = E::fields()
            .iter()
            .find(|f| f.primary_key)
            .map(|f| f.column);

        let mut insert = Insert::new(E::TABLE);
        let mut row = Vec::new();
        for (column, value) in record.column_values() {
            if pk_column == Some(column) && value.is_null() {
                continue;
            }
            insert.columns.push(column.to_string());
            row.push(value);
        }
        insert.rows.push(row);
        insert
    }

    /// Set the column list, replacing any previous one.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|&c| c.to_string()).collect();
        self
    }

    /// Append one VALUES row.
    pub fn values(mut self, row: Vec<impl Into<Value>>) -> Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Build the SQL string and its positional arguments.
    ///
    /// Fails when no columns or rows were supplied, and when any row's
    /// value count differs from the column count.
    pub fn build(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(Error::build(
                BuildErrorKind::EmptyClause,
                format!("INSERT INTO {} needs columns and at least one row", self.table),
            ));
        }

        let mut params = Vec::new();
        let mut groups = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if row.len() != self.columns.len() {
                return Err(Error::build(
                    BuildErrorKind::ValueCountMismatch,
                    format!(
                        "INSERT INTO {} has {} columns but a row with {} values",
                        self.table,
                        self.columns.len(),
                        row.len()
                    ),
                ));
            }
            let placeholders = dialect.placeholders(params.len() + 1, row.len());
            params.extend(row.iter().cloned());
            groups.push(format!("({})", placeholders.join(", ")));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            self.columns.join(", "),
            groups.join(", ")
        );
        Ok((sql, params))
    }
}

/// UPDATE statement builder.
///
/// SET pairs are kept in the order they were added, so emitted SQL is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Update {
    table: String,
    sets: Vec<(String, Value)>,
    where_clause: Option<Cond>,
}

impl Update {
    /// Create an UPDATE of a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sets: Vec::new(),
            where_clause: None,
        }
    }

    /// Build an UPDATE for an entity instance: every stored non-key field
    /// is SET, filtered by the primary key.
    ///
    /// Fails with the distinct missing-primary-key error when the entity
    /// declares no primary key or the instance's key value is NULL.
    pub fn from_entity<E: Entity>(record: &E) -> Result<Self> {
        let pk = E::fields().iter().find(|f| f.primary_key).ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::MissingPrimaryKey,
                format!("entity for table '{}' declares no primary key", E::TABLE),
            )
        })?;
        let key = record.primary_key_value();
        if key.is_null() {
            return Err(Error::schema(
                SchemaErrorKind::MissingPrimaryKey,
                format!("record for table '{}' has no primary key value", E::TABLE),
            ));
        }

        let mut update = Update::new(E::TABLE);
        for (column, value) in record.column_values() {
            if column == pk.column {
                continue;
            }
            update.sets.push((column.to_string(), value));
        }
        update.where_clause = Some(Cond::eq(pk.column, key));
        Ok(update)
    }

    /// Append one SET pair.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push((column.into(), value.into()));
        self
    }

    /// Add a WHERE condition, AND-combined with any existing one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Build the SQL string and its positional arguments.
    pub fn build(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        if self.sets.is_empty() {
            return Err(Error::build(
                BuildErrorKind::EmptyClause,
                format!("UPDATE {} has no SET pairs", self.table),
            ));
        }

        let mut params = Vec::new();
        let mut pairs = Vec::with_capacity(self.sets.len());
        for (column, value) in &self.sets {
            params.push(value.clone());
            pairs.push(format!("{} = {}", column, dialect.placeholder(params.len())));
        }

        let mut sql = format!("UPDATE {} SET {}", self.table, pairs.join(", "));
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.render(dialect, &mut params));
        }
        Ok((sql, params))
    }
}

/// DELETE statement builder.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    table: String,
    where_clause: Option<Cond>,
}

impl Delete {
    /// Create a DELETE from a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
        }
    }

    /// Build a DELETE for an entity instance, filtered by its primary key.
    ///
    /// Fails with the distinct missing-primary-key error when the entity
    /// declares no primary key or the instance's key value is NULL.
    pub fn from_entity<E: Entity>(record: &E) -> Result<Self> {
        let pk = E::fields().iter().find(|f| f.primary_key).ok_or_else(|| {
            Error::schema(
                SchemaErrorKind::MissingPrimaryKey,
                format!("entity for table '{}' declares no primary key", E::TABLE),
            )
        })?;
        let key = record.primary_key_value();
        if key.is_null() {
            return Err(Error::schema(
                SchemaErrorKind::MissingPrimaryKey,
                format!("record for table '{}' has no primary key value", E::TABLE),
            ));
        }
        Ok(Delete::new(E::TABLE).filter(Cond::eq(pk.column, key)))
    }

    /// Add a WHERE condition, AND-combined with any existing one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(cond),
            None => cond,
        });
        self
    }

    /// Build the SQL string and its positional arguments.
    pub fn build(&self, dialect: Dialect) -> Result<(String, Vec<Value>)> {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.table);
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.render(dialect, &mut params));
        }
        Ok((sql, params))
    }
}
